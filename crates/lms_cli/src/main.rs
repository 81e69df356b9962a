//! `lms` command line front end over `lms_core`.
//!
//! # Responsibility
//! - Resolve config (file, then flag overrides) and open the store.
//! - Map each subcommand onto one service call and print a short result.

use clap::{Parser, Subcommand};
use lms_core::{
    init_logging, placeholders, render_template, seed_demo_data, AppConfig, BackendKind, EmailDraft,
    Course, HttpMailTransport, LmsStore, MemoryStorage, NewUser, SqliteStorage, StorageBackend, User,
    UserRole,
};
use log::{error, info};
use std::collections::BTreeMap;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

type CliResult<T> = Result<T, Box<dyn Error>>;
type CliStore = LmsStore<Box<dyn StorageBackend>>;

#[derive(Parser)]
#[command(name = "lms")]
#[command(about = "Learning management store and dashboards", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite file; overrides `storage.path`.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Use a throwaway in-memory store.
    #[arg(long, global = true, conflicts_with = "db")]
    memory: bool,

    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load demo data into an empty store.
    Seed,
    Users {
        #[arg(short, long)]
        role: Option<String>,
        #[arg(short, long)]
        search: Option<String>,
    },
    AddUser {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, default_value = "employee")]
        role: String,
        #[arg(short, long)]
        department: Option<String>,
    },
    Courses {
        #[arg(short, long)]
        assigned_to: Option<String>,
        #[arg(short, long)]
        search: Option<String>,
    },
    Assign {
        #[arg(short, long)]
        course: String,
        #[arg(short, long = "user", required = true)]
        users: Vec<String>,
    },
    CompleteLesson {
        #[arg(short, long)]
        course: String,
        #[arg(short, long)]
        lesson: String,
        #[arg(short, long)]
        user: String,
    },
    AwardBadge {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        badge: String,
    },
    /// Employee or candidate dashboard, picked by the user's role.
    Dashboard {
        #[arg(short, long)]
        user: String,
    },
    /// HR overview across all users and courses.
    Overview,
    Announce {
        #[arg(short, long)]
        author: String,
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        body: String,
        /// Limit to these roles; everyone when omitted.
        #[arg(long = "role")]
        roles: Vec<String>,
        #[arg(long)]
        pinned: bool,
    },
    SendMail {
        #[arg(short, long = "to", required = true)]
        to: Vec<String>,
        #[arg(short, long)]
        subject: String,
        /// HTML body; `{{ name }}` placeholders are filled from `--var`.
        #[arg(long)]
        template: String,
        /// `key=value` template variable.
        #[arg(long = "var")]
        vars: Vec<String>,
    },
    Theme {
        #[arg(long)]
        company_name: Option<String>,
        #[arg(long)]
        primary_color: Option<String>,
        #[arg(long)]
        dark_mode: Option<bool>,
        #[arg(long, conflicts_with_all = ["company_name", "primary_color", "dark_mode"])]
        reset: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    let level_flag = cli.log_level.is_some();
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(path) = cli.db {
        config.storage.backend = BackendKind::Sqlite;
        config.storage.path = path;
    }
    if cli.memory {
        config.storage.backend = BackendKind::Memory;
    }

    // Stderr logging only on request; files whenever a directory is configured.
    if level_flag || config.logging.dir.is_some() {
        init_logging(&config.logging)?;
    }

    let store = open_store(&config)?;
    execute(&store, &config, cli.command)
}

fn open_store(config: &AppConfig) -> CliResult<CliStore> {
    let backend: Box<dyn StorageBackend> = match config.storage.backend {
        BackendKind::Sqlite => Box::new(SqliteStorage::open(&config.storage.path)?),
        BackendKind::Memory => Box::new(MemoryStorage::new()),
    };
    Ok(LmsStore::new(backend))
}

fn execute(store: &CliStore, config: &AppConfig, command: Commands) -> CliResult<()> {
    match command {
        Commands::Seed => {
            if seed_demo_data(store)? {
                println!("seeded demo data");
            } else {
                println!("store already has users; nothing seeded");
            }
        }
        Commands::Users { role, search } => {
            let role = role.as_deref().map(parse_role).transpose()?;
            let users = select_users(store, role, search.as_deref())?;
            for user in users {
                println!(
                    "{}\t{}\t{}\t{}\t{} pts",
                    user.id, user.role, user.name, user.email, user.points
                );
            }
        }
        Commands::AddUser {
            name,
            email,
            role,
            department,
        } => {
            let mut new_user = NewUser::new(name, email, parse_role(&role)?);
            new_user.department = department;
            let user = store.users().create_user(new_user)?;
            println!("created user {}", user.id);
        }
        Commands::Courses {
            assigned_to,
            search,
        } => {
            let courses = select_courses(store, assigned_to.as_deref(), search.as_deref())?;
            for course in courses {
                println!(
                    "{}\t{}\t{} lessons\t{} assigned",
                    course.id,
                    course.title,
                    course.lessons.len(),
                    course.assigned_to.len()
                );
            }
        }
        Commands::Assign { course, users } => {
            let course = store
                .courses()
                .assign_course(&course, &users)?
                .ok_or_else(|| format!("course `{course}` not found"))?;
            println!("{} now has {} assignees", course.id, course.assigned_to.len());
        }
        Commands::CompleteLesson {
            course,
            lesson,
            user,
        } => {
            let updated = store
                .courses()
                .complete_lesson(&course, &lesson, &user)?
                .ok_or_else(|| format!("course `{course}` not found"))?;
            println!("progress {}%", updated.progress_for(&user));
        }
        Commands::AwardBadge { user, badge } => {
            let updated = store
                .engagement()
                .award_badge(&user, &badge)?
                .ok_or_else(|| format!("user `{user}` not found"))?;
            println!("{} has {} badges, {} pts", updated.id, updated.badges.len(), updated.points);
        }
        Commands::Dashboard { user } => print_dashboard(store, &user)?,
        Commands::Overview => {
            let overview = store.dashboards().hr_overview()?;
            println!(
                "users: {} (admin {}, hr {}, employee {}, candidate {})",
                overview.total_users,
                overview.admins,
                overview.hr,
                overview.employees,
                overview.candidates
            );
            println!(
                "courses: {} ({} published)",
                overview.total_courses, overview.published_courses
            );
            println!("completion rate: {:.1}%", overview.completion_rate);
            println!("pending evaluations: {}", overview.pending_evaluations);
        }
        Commands::Announce {
            author,
            title,
            body,
            roles,
            pinned,
        } => {
            let mut announcement = lms_core::Announcement::new(author, title, body);
            announcement.audience = roles
                .iter()
                .map(|role| parse_role(role))
                .collect::<CliResult<Vec<_>>>()?;
            announcement.pinned = pinned;
            let announcement = store.messaging().publish_announcement(announcement)?;
            println!("published announcement {}", announcement.id);
        }
        Commands::SendMail {
            to,
            subject,
            template,
            vars,
        } => {
            let vars = parse_vars(&vars)?;
            let missing = placeholders(&template)
                .into_iter()
                .filter(|name| !vars.contains_key(name))
                .collect::<Vec<_>>();
            if !missing.is_empty() {
                return Err(format!("missing template variables: {}", missing.join(", ")).into());
            }
            let transport = HttpMailTransport::new(&config.mail)?;
            info!(
                "event=mail_dispatch module=cli status=start endpoint={} recipients={}",
                transport.endpoint(),
                to.len()
            );
            let draft = EmailDraft {
                recipients: to,
                subject,
                html_content: render_template(&template, &vars),
                sender_id: config.mail.sender_id.clone(),
            };
            let sent = store.messaging().send_email(&transport, &draft)?;
            for email in sent {
                println!(
                    "{}\t{}",
                    email.to,
                    email.tracking_id.as_deref().unwrap_or("-")
                );
            }
        }
        Commands::Theme {
            company_name,
            primary_color,
            dark_mode,
            reset,
        } => {
            let theme = if reset {
                store.theme().reset_theme()?
            } else {
                store.theme().update_theme(|theme| {
                    if let Some(name) = company_name {
                        theme.company_name = name;
                    }
                    if let Some(color) = primary_color {
                        theme.primary_color = color;
                    }
                    if let Some(dark) = dark_mode {
                        theme.dark_mode = dark;
                    }
                })?
            };
            println!(
                "{} primary={} dark_mode={}",
                theme.company_name, theme.primary_color, theme.dark_mode
            );
        }
    }
    info!("event=cli_command module=cli status=ok");
    Ok(())
}

fn print_dashboard(store: &CliStore, user_id: &str) -> CliResult<()> {
    let user = store
        .users()
        .get_user(user_id)?
        .ok_or_else(|| format!("user `{user_id}` not found"))?;

    if user.role == UserRole::Candidate {
        if let Some(dashboard) = store.dashboards().candidate_dashboard(user_id)? {
            println!("{} ({})", dashboard.user.name, dashboard.user.role);
            println!(
                "evaluations: {} pending, {} submitted",
                dashboard.pending_evaluations, dashboard.submitted_evaluations
            );
            match dashboard.average_score {
                Some(score) => println!("average score: {score:.1}%"),
                None => println!("average score: -"),
            }
            println!("upcoming interviews: {}", dashboard.upcoming_interviews);
        }
        return Ok(());
    }

    if let Some(dashboard) = store.dashboards().employee_dashboard(user_id)? {
        println!("{} ({})", dashboard.user.name, dashboard.user.role);
        println!(
            "courses: {} assigned, {} completed, {} in progress, {:.0}% average",
            dashboard.assigned_courses,
            dashboard.completed_courses,
            dashboard.in_progress_courses,
            dashboard.average_progress
        );
        println!("points: {} ({} badges)", dashboard.points, dashboard.badge_count);
        println!(
            "unread: {} messages, {} notifications",
            dashboard.unread_messages, dashboard.unread_notifications
        );
        println!("upcoming meetings: {}", dashboard.upcoming_meetings);
    }
    Ok(())
}

/// Users matching every given filter; no filters lists everyone.
fn select_users<B: StorageBackend>(
    store: &LmsStore<B>,
    role: Option<UserRole>,
    search: Option<&str>,
) -> CliResult<Vec<User>> {
    let mut users = match search {
        Some(text) => store.users().search_users(text)?,
        None => store.users().list_users()?,
    };
    if let Some(role) = role {
        users.retain(|user| user.role == role);
    }
    Ok(users)
}

/// Courses matching every given filter; no filters lists the catalog.
fn select_courses<B: StorageBackend>(
    store: &LmsStore<B>,
    assigned_to: Option<&str>,
    search: Option<&str>,
) -> CliResult<Vec<Course>> {
    let mut courses = match search {
        Some(text) => store.courses().search_courses(text, None)?,
        None => store.courses().list_courses()?,
    };
    if let Some(user_id) = assigned_to {
        courses.retain(|course| course.is_assigned_to(user_id));
    }
    Ok(courses)
}

fn parse_role(value: &str) -> CliResult<UserRole> {
    Ok(value.parse::<UserRole>()?)
}

fn parse_vars(pairs: &[String]) -> CliResult<BTreeMap<String, String>> {
    pairs
        .iter()
        .map(|pair| -> CliResult<(String, String)> {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("template variable `{pair}` must be key=value"))?;
            Ok((key.trim().to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{parse_vars, select_courses, select_users, Cli};
    use clap::Parser;
    use lms_core::{seed_demo_data, LmsStore, UserRole};

    #[test]
    fn template_vars_split_on_first_equals() {
        let vars = parse_vars(&["name=Ana".to_string(), "link=a=b".to_string()]).unwrap();
        assert_eq!(vars["name"], "Ana");
        assert_eq!(vars["link"], "a=b");
        assert!(parse_vars(&["broken".to_string()]).is_err());
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["lms", "users", "--role", "hr", "--memory"]).unwrap();
        assert!(cli.memory);
        assert!(Cli::try_parse_from(["lms", "overview", "--memory", "--db", "x.db"]).is_err());
    }

    #[test]
    fn role_and_search_filters_combine() {
        let store = LmsStore::in_memory();
        seed_demo_data(&store).unwrap();

        let employees = select_users(&store, Some(UserRole::Employee), None).unwrap();
        assert_eq!(employees.len(), 2);
        let ana = select_users(&store, Some(UserRole::Employee), Some("ana")).unwrap();
        assert_eq!(ana.len(), 1);
        assert_eq!(ana[0].email, "ana@lms.test");
        assert!(select_users(&store, Some(UserRole::Hr), Some("ana")).unwrap().is_empty());
    }

    #[test]
    fn assignment_and_search_filters_combine() {
        let store = LmsStore::in_memory();
        seed_demo_data(&store).unwrap();
        let ben = store.users().find_by_email("ben@lms.test").unwrap().unwrap();

        assert_eq!(select_courses(&store, Some(&ben.id), None).unwrap().len(), 1);
        assert!(select_courses(&store, Some(&ben.id), Some("security"))
            .unwrap()
            .is_empty());
        assert_eq!(select_courses(&store, None, Some("security")).unwrap().len(), 1);
    }
}
