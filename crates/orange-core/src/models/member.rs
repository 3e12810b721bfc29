use serde::{Deserialize, Serialize};

use crate::api::{FormBody, ImageUpload, Resource};

use super::{display_or_dash, join_name};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub membership_date: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Server-relative path of the member photo
    #[serde(default)]
    pub image: Option<String>,
}

impl Member {
    pub fn full_name(&self) -> String {
        join_name(&self.first_name, &self.last_name)
    }

    pub fn phone_display(&self) -> String {
        display_or_dash(&self.phone_number)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberForm {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub membership_date: String,
    pub address: String,
    /// New photo to upload; `None` leaves the stored photo alone
    pub image: Option<ImageUpload>,
}

impl From<&Member> for MemberForm {
    fn from(member: &Member) -> Self {
        Self {
            first_name: member.first_name.clone().unwrap_or_default(),
            last_name: member.last_name.clone().unwrap_or_default(),
            phone_number: member.phone_number.clone().unwrap_or_default(),
            membership_date: member.membership_date.clone().unwrap_or_default(),
            address: member.address.clone().unwrap_or_default(),
            image: None,
        }
    }
}

/// The `/member/` collection
pub struct Members;

impl Resource for Members {
    type Record = Member;
    type Form = MemberForm;

    const LABEL: &'static str = "Member";
    const COLLECTION: &'static str = "/member/";

    fn record_id(record: &Member) -> i64 {
        record.id
    }

    fn encode(form: &MemberForm) -> FormBody {
        FormBody::Multipart {
            fields: vec![
                ("first_name", form.first_name.clone()),
                ("last_name", form.last_name.clone()),
                ("phone_number", form.phone_number.clone()),
                ("membership_date", form.membership_date.clone()),
                ("address", form.address.clone()),
            ],
            image: form.image.clone(),
        }
    }

    fn created_message() -> String {
        "Member created successfully".to_string()
    }
}
