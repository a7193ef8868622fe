mod app;
mod assign;
mod auth;
mod calendar;
mod canvas;
mod daysheet;
mod form;
mod help;
mod logging;
mod mentor;
mod plan;
mod proof;
mod routes;
mod sheet;
mod theme;
use crate::app::App;
use crate::auth::{default_auth_path, AuthStore, Role};
use crate::calendar::{CalendarView, WeekStart};
use crate::plan::{StudyPlan, YMD_FMT};
use crate::routes::{redirect_for_role, resolve, Route};
use anyhow::Context;
use crossterm::{
    event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute,
};
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::io;
use std::path::PathBuf;
use time::{Date, OffsetDateTime};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct RunOptions {
    date: Option<Date>,
    plan: Option<PathBuf>,
    view: Option<Route>,
    week_start: WeekStart,
    auth_file: Option<PathBuf>,
    log_file: Option<PathBuf>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run(RunOptions),
    Login {
        token: String,
        role: Role,
        auth_file: Option<PathBuf>,
    },
    Logout {
        auth_file: Option<PathBuf>,
    },
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut opts = RunOptions::default();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Long("plan") => opts.plan = Some(PathBuf::from(parser.value()?)),
                Arg::Long("view") => opts.view = Some(parser.value()?.parse()?),
                Arg::Long("week-start") => opts.week_start = parser.value()?.parse()?,
                Arg::Long("auth-file") => opts.auth_file = Some(PathBuf::from(parser.value()?)),
                Arg::Long("log-file") => opts.log_file = Some(PathBuf::from(parser.value()?)),
                Arg::Value(value) if opts.date.is_none() => {
                    let value = value.string()?;
                    match value.as_str() {
                        "login" => return Command::login_from_parser(parser, opts.auth_file),
                        "logout" => return Command::logout_from_parser(parser, opts.auth_file),
                        _ => match Date::parse(&value, &YMD_FMT) {
                            Ok(d) => opts.date = Some(d),
                            Err(e) => {
                                return Err(lexopt::Error::ParsingFailed {
                                    value,
                                    error: Box::new(e),
                                })
                            }
                        },
                    }
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run(opts))
    }

    fn login_from_parser(
        mut parser: Parser,
        mut auth_file: Option<PathBuf>,
    ) -> Result<Command, lexopt::Error> {
        let mut token = None;
        let mut role = None;
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Long("token") => token = Some(parser.value()?.string()?),
                Arg::Long("role") => role = Some(parser.value()?.parse()?),
                Arg::Long("auth-file") => auth_file = Some(PathBuf::from(parser.value()?)),
                _ => return Err(arg.unexpected()),
            }
        }
        let Some(token) = token else {
            return Err(lexopt::Error::MissingValue {
                option: Some(String::from("--token")),
            });
        };
        let Some(role) = role else {
            return Err(lexopt::Error::MissingValue {
                option: Some(String::from("--role")),
            });
        };
        Ok(Command::Login {
            token,
            role,
            auth_file,
        })
    }

    fn logout_from_parser(
        mut parser: Parser,
        mut auth_file: Option<PathBuf>,
    ) -> Result<Command, lexopt::Error> {
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Long("auth-file") => auth_file = Some(PathBuf::from(parser.value()?)),
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Logout { auth_file })
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run(opts) => {
                let today = OffsetDateTime::now_local()
                    .context("failed to determine local date")?
                    .date();
                logging::init(opts.log_file.as_deref())?;
                let auth = AuthStore::load(opts.auth_file.unwrap_or_else(default_auth_path))
                    .context("failed to load login state")?;
                let requested = opts
                    .view
                    .unwrap_or_else(|| redirect_for_role(auth.state().role()));
                let route = resolve(requested, auth.state())?;
                let plan = match opts.plan {
                    Some(path) => StudyPlan::load(&path)?,
                    None => StudyPlan::demo(today),
                };
                let mut calendar = CalendarView::new(today).week_start(opts.week_start);
                if let Some(date) = opts.date {
                    calendar = calendar.start_date(date);
                }
                tracing::info!(%route, %today, "starting");
                let app = App::new(route, calendar, plan);
                with_terminal(|mut terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    app.run(terminal)?;
                    Ok(())
                })
            }
            Command::Login {
                token,
                role,
                auth_file,
            } => {
                let mut store = AuthStore::load(auth_file.unwrap_or_else(default_auth_path))?;
                store.set_auth(token, role)?;
                println!("Signed in as {role} ({})", store.path().display());
                Ok(())
            }
            Command::Logout { auth_file } => {
                let mut store = AuthStore::load(auth_file.unwrap_or_else(default_auth_path))?;
                let was_signed_in = store.state().is_authenticated();
                store.logout()?;
                if was_signed_in {
                    println!("Signed out");
                } else {
                    println!("Not signed in");
                }
                Ok(())
            }
            Command::Help => {
                println!("Usage: studyplan [<options>] [YYYY-MM-DD]");
                println!("       studyplan login --token <TOKEN> --role <mentee|mentor>");
                println!("       studyplan logout");
                println!();
                println!("Terminal study planner: monthly to-do calendar with a drag-to-dismiss day sheet");
                println!();
                println!("Options:");
                println!("  --plan <FILE>              Load to-dos from a JSON plan file");
                println!("  --view <mentee|mentor>     Screen to open (default: by role)");
                println!("  --week-start <mon|sun>     First day of the week [default: mon]");
                println!("  --auth-file <FILE>         Login state file [default: ~/.studyplan-auth.json]");
                println!("  --log-file <FILE>          Write logs to FILE (filter with STUDYPLAN_LOG)");
                println!("  -h, --help                 Display this help message and exit");
                println!("  -V, --version              Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = execute!(io::stdout(), EnableMouseCapture, EnableFocusChange)
        .context("failed to enable mouse capture")
        .and_then(|()| func(terminal));
    let cleanup = execute!(io::stdout(), DisableFocusChange, DisableMouseCapture);
    ratatui::restore();
    finish_terminal(r, cleanup)
}

/// Combines the result of a terminal session with the result of turning mouse
/// capture back off.  A session error wins; a cleanup error is always logged.
fn finish_terminal<T>(r: anyhow::Result<T>, cleanup: io::Result<()>) -> anyhow::Result<T> {
    if let Err(e) = &cleanup {
        tracing::warn!(error = %e, "failed to disable mouse capture");
    }
    let value = r?;
    cleanup.context("failed to disable mouse capture")?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn parse(args: &[&str]) -> Result<Command, lexopt::Error> {
        Command::from_parser(Parser::from_iter(
            std::iter::once("studyplan").chain(args.iter().copied()),
        ))
    }

    #[test]
    fn test_run_options() {
        let cmd = parse(&[
            "--plan",
            "plan.json",
            "--view",
            "mentor",
            "--week-start",
            "sun",
            "2026-02-05",
        ])
        .unwrap();
        assert_eq!(
            cmd,
            Command::Run(RunOptions {
                date: Some(date!(2026 - 02 - 05)),
                plan: Some(PathBuf::from("plan.json")),
                view: Some(Route::MentorDashboard),
                week_start: WeekStart::Sunday,
                auth_file: None,
                log_file: None,
            })
        );
    }

    #[test]
    fn test_no_args() {
        assert_eq!(parse(&[]).unwrap(), Command::Run(RunOptions::default()));
    }

    #[test]
    fn test_bad_date() {
        assert!(parse(&["2026-02-30"]).is_err());
        assert!(parse(&["2026-02-05", "2026-02-06"]).is_err());
    }

    #[test]
    fn test_login() {
        let cmd = parse(&[
            "--auth-file",
            "a.json",
            "login",
            "--role",
            "mentee",
            "--token",
            "abc",
        ])
        .unwrap();
        assert_eq!(
            cmd,
            Command::Login {
                token: String::from("abc"),
                role: Role::Mentee,
                auth_file: Some(PathBuf::from("a.json")),
            }
        );
        assert!(parse(&["login", "--token", "abc"]).is_err());
        assert!(parse(&["login", "--role", "boss", "--token", "abc"]).is_err());
    }

    #[test]
    fn test_finish_terminal() {
        assert_eq!(finish_terminal(Ok(1), Ok(())).unwrap(), 1);
        let e = finish_terminal(Ok(1), Err(io::Error::other("gone"))).unwrap_err();
        assert_eq!(e.to_string(), "failed to disable mouse capture");
        let e = finish_terminal::<()>(
            Err(anyhow::anyhow!("draw failed")),
            Err(io::Error::other("gone")),
        )
        .unwrap_err();
        assert_eq!(e.to_string(), "draw failed");
    }

    #[test]
    fn test_logout() {
        assert_eq!(
            parse(&["logout"]).unwrap(),
            Command::Logout { auth_file: None }
        );
    }
}
