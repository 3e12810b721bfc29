//! Command handlers. Every record command runs through a screen controller so
//! the terminal shows the same notices a graphical front end would.

use std::io::{self, Write};

use anyhow::{bail, Result};
use orange_core::api::{ApiClient, ImageUpload, Resource};
use orange_core::auth::SessionState;
use orange_core::config::Config;
use orange_core::models::{
    Book, BookForm, Books, Librarian, LibrarianForm, Librarians, Member, MemberForm, Members,
    Student, StudentForm, StudentSortColumn, Students,
};
use orange_core::navigation::{routes_for, Navigator, Route};
use orange_core::screens::{LoginScreen, Notice, ResourceScreen, StudentRecordScreen};
use tracing::{debug, info, warn};

use crate::cli::{BookArgs, LibrarianArgs, MemberArgs, StudentArgs};

// ===== Session commands =====

pub async fn login(
    api: ApiClient,
    config: &mut Config,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let username = match username.or_else(|| config.last_username.clone()) {
        Some(name) => name,
        None => prompt("Username: ")?,
    };
    let password = match password {
        Some(password) => password,
        None => rpassword::prompt_password(format!("Password for {}: ", username))?,
    };

    let mut screen = LoginScreen::new(api).with_username(username);
    screen.password = password;

    if !screen.submit().await {
        bail!(screen.error.unwrap_or_else(|| "Login failed".to_string()));
    }

    if let Err(e) = config.remember_username(&screen.username) {
        // The session is already stored; only the username hint is lost
        warn!("Failed to save config: {:#}", e);
    }
    println!("Logged in as {}", screen.username);
    Ok(())
}

pub fn logout(api: &ApiClient) -> Result<()> {
    api.session().logout()?;
    println!("Logged out");
    Ok(())
}

pub async fn status(api: &ApiClient, config: &Config) -> Result<()> {
    let state = api.session().initialize(api).await?;
    let navigator = Navigator::new(api.session().subscribe());

    println!("Server:  {}", config.api_url());
    println!(
        "Session: {}",
        match state {
            SessionState::Authenticated => "logged in",
            SessionState::Unauthenticated => "logged out",
        }
    );
    let titles: Vec<&str> = navigator.routes().iter().map(|r| r.title()).collect();
    println!("Screens: {}", titles.join(", "));
    Ok(())
}

/// Validate the stored token and make sure `route` is reachable.
///
/// Protected commands call this first so an expired session fails with a
/// hint instead of a list of request errors.
pub async fn enter(api: &ApiClient, route: Route) -> Result<()> {
    let state = api.session().initialize(api).await?;
    let mut navigator = Navigator::new(api.session().subscribe());
    if !navigator.navigate(route) {
        debug!(?state, routes = ?routes_for(state), "Route not reachable");
        bail!("Not logged in. Run `orange login` first.");
    }
    info!(route = route.title(), "Entered screen");
    Ok(())
}

// ===== Record commands =====

/// Maps command line flags onto a resource form. Flags left out keep the
/// value already in the form.
pub trait FormArgs {
    type Resource: Resource;

    fn apply(self, form: &mut <Self::Resource as Resource>::Form);
}

pub async fn list<R: Resource>(api: ApiClient, render: impl Fn(&R::Record) -> String) -> Result<()> {
    let mut screen = ResourceScreen::<R>::mount(api);
    screen.settle().await;
    let failed = report(screen.take_notices());

    for record in screen.records() {
        println!("{}", render(record));
    }
    if screen.records().is_empty() && !failed {
        println!("No {} records", R::LABEL.to_lowercase());
    }
    finish(failed)
}

pub async fn add<A>(api: ApiClient, args: A) -> Result<()>
where
    A: FormArgs,
    <A::Resource as Resource>::Form: Default,
{
    let mut form = Default::default();
    args.apply(&mut form);

    let mut screen = ResourceScreen::<A::Resource>::new(api);
    screen.save(None, form);
    screen.settle().await;
    finish(report(screen.take_notices()))
}

pub async fn edit<A>(api: ApiClient, id: i64, args: A) -> Result<()>
where
    A: FormArgs,
    for<'a> <A::Resource as Resource>::Form: From<&'a <A::Resource as Resource>::Record>,
{
    let mut screen = ResourceScreen::<A::Resource>::mount(api);
    screen.settle().await;
    if report(screen.take_notices()) {
        return finish(true);
    }

    let Some(record) = screen.find(id) else {
        bail!("No {} with id {}", <A::Resource as Resource>::LABEL.to_lowercase(), id);
    };
    let mut form: <A::Resource as Resource>::Form = record.into();
    args.apply(&mut form);

    screen.save(Some(id), form);
    screen.settle().await;
    finish(report(screen.take_notices()))
}

pub async fn delete<R: Resource>(api: ApiClient, id: i64) -> Result<()> {
    let mut screen = ResourceScreen::<R>::new(api);
    screen.delete(id);
    screen.settle().await;
    finish(report(screen.take_notices()))
}

pub async fn list_students(
    api: ApiClient,
    config: &Config,
    sort: StudentSortColumn,
    descending: bool,
) -> Result<()> {
    let mut screen = StudentRecordScreen::mount(api);
    screen.settle().await;
    screen.sort_column = sort;
    screen.sort_ascending = !descending;

    let failed = report(screen.screen_mut().take_notices());
    for student in screen.sorted() {
        println!("{}", render_student(&student, config));
    }
    finish(failed)
}

pub async fn register_student(api: ApiClient, args: StudentArgs) -> Result<()> {
    let mut form = StudentForm::default();
    args.apply(&mut form);

    let mut screen = StudentRecordScreen::mount(api);
    screen.register(None, form);
    screen.settle().await;
    finish(report(screen.screen_mut().take_notices()))
}

// ===== Rendering =====

pub fn render_book(book: &Book) -> String {
    format!(
        "{:>5}  {:<32}  {:<24}  {}",
        book.id,
        truncate(&book.title_display(), 32),
        truncate(&book.author_display(), 24),
        book.isbn.as_deref().unwrap_or("-"),
    )
}

pub fn render_librarian(librarian: &Librarian) -> String {
    format!(
        "{:>5}  {:<32}  {}",
        librarian.id,
        truncate(&librarian.full_name(), 32),
        librarian.email_display(),
    )
}

pub fn render_member(member: &Member, config: &Config) -> String {
    format!(
        "{:>5}  {:<32}  {:<16}  {}",
        member.id,
        truncate(&member.full_name(), 32),
        member.phone_display(),
        photo(&member.image, config),
    )
}

pub fn render_student(student: &Student, config: &Config) -> String {
    format!(
        "{:>5}  {:<32}  {:<16}  {}",
        student.id,
        truncate(&student.full_name(), 32),
        truncate(student.program.as_deref().unwrap_or("-"), 16),
        photo(&student.image, config),
    )
}

fn photo(image: &Option<String>, config: &Config) -> String {
    match image.as_deref() {
        Some(path) if !path.is_empty() => config.media_url(path),
        _ => String::new(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Print notices; returns true if any of them was an error
fn report(notices: Vec<Notice>) -> bool {
    let mut failed = false;
    for notice in notices {
        if notice.is_error() {
            failed = true;
            match &notice.detail {
                Some(detail) => eprintln!("{}: {} ({})", notice.title(), notice.message, detail),
                None => eprintln!("{}: {}", notice.title(), notice.message),
            }
        } else {
            println!("{}", notice.message);
        }
    }
    failed
}

fn finish(failed: bool) -> Result<()> {
    if failed {
        bail!("Request failed");
    }
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

// ===== Flag mapping =====

fn set(target: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *target = value;
    }
}

impl FormArgs for BookArgs {
    type Resource = Books;

    fn apply(self, form: &mut BookForm) {
        set(&mut form.title, self.title);
        set(&mut form.isbn, self.isbn);
        set(&mut form.author, self.author);
        set(&mut form.publication_date, self.publication_date);
        if self.librarian.is_some() {
            form.librarian = self.librarian;
        }
    }
}

impl FormArgs for LibrarianArgs {
    type Resource = Librarians;

    fn apply(self, form: &mut LibrarianForm) {
        set(&mut form.first_name, self.first_name);
        set(&mut form.last_name, self.last_name);
        set(&mut form.hire_date, self.hire_date);
        set(&mut form.email, self.email);
    }
}

impl FormArgs for MemberArgs {
    type Resource = Members;

    fn apply(self, form: &mut MemberForm) {
        set(&mut form.first_name, self.first_name);
        set(&mut form.last_name, self.last_name);
        set(&mut form.phone_number, self.phone_number);
        set(&mut form.membership_date, self.membership_date);
        set(&mut form.address, self.address);
        if let Some(path) = self.image {
            form.image = Some(ImageUpload::new(path));
        }
    }
}

impl FormArgs for StudentArgs {
    type Resource = Students;

    fn apply(self, form: &mut StudentForm) {
        set(&mut form.firstname, self.firstname);
        set(&mut form.lastname, self.lastname);
        set(&mut form.admissiondate, self.admissiondate);
        set(&mut form.program, self.program);
        set(&mut form.address, self.address);
        if let Some(path) = self.image {
            form.image = Some(ImageUpload::new(path));
        }
    }
}
