//! EV Spot command line - find charging stations and manage charging
//! sessions from a terminal.
//!
//! Each subcommand feeds one event through the same view controller a
//! browser page would use and prints what the page would show.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use evspot_core::auth::{CookieFile, FileStorage, StorageError};
use evspot_core::map::LatLng;
use evspot_core::models::StationId;
use evspot_core::ui::{elements, AlertKind, FormData, UiEvent};
use evspot_core::{ApiClient, Config, MapWidget, ViewController};

const USAGE: &str = "\
Usage: evspot <command> [args]

Commands:
  login [username]              Log in (prompts for the password)
  register <username> <email>   Create an account
  logout                        End the session
  whoami                        Show the logged-in user
  nearby <lat> <lng> [radius]   List stations within radius km (default 10)
  start <station-id>            Start charging at a station
  stop <station-id>             Stop charging at a station
  favorite <station-id>         Add a station to favorites
  sessions                      List your charging sessions
  map                           Print the map widget as JSON

Environment:
  EVSPOT_API_URL                API base URL (default http://localhost:8000/)
  RUST_LOG                      Log filter (default warn)";

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // RUST_LOG controls the level, e.g. RUST_LOG=evspot_core=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };
    let rest = &args[1..];

    if command == "map" {
        return print_map();
    }
    if matches!(command.as_str(), "help" | "--help" | "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    let mut config = Config::load().context("Failed to load config")?;
    let cookies = open_cookies(&config)?;
    let mut view = build_view(&config, &cookies).await?;

    let result = run(&mut view, &mut config, command, rest).await;
    view.teardown();

    // Keep the server session for the next run, even if the command failed
    cookies
        .save()
        .with_context(|| format!("Failed to save {}", cookies.path().display()))?;
    result
}

async fn run(
    view: &mut ViewController,
    config: &mut Config,
    command: &str,
    rest: &[String],
) -> Result<()> {
    match command {
        "login" => login(view, config, rest).await,
        "register" => register(view, rest).await,
        "logout" => {
            view.dispatch(elements::LOGOUT_BUTTON, UiEvent::Click).await;
            report(view)
        }
        "whoami" => match view.session().current_user() {
            Some(user) => {
                println!("{}", user.display_name());
                Ok(())
            }
            None => bail!("Not logged in"),
        },
        "nearby" => nearby(view, rest).await,
        "start" => station_action(view, rest, elements::START_CHARGING_BUTTON).await,
        "stop" => station_action(view, rest, elements::STOP_CHARGING_BUTTON).await,
        "favorite" => station_action(view, rest, elements::FAVORITE_BUTTON).await,
        "sessions" => {
            view.dispatch(elements::SESSIONS_BUTTON, UiEvent::Click).await;
            print_target(view, elements::SESSION_LIST)
        }
        other => bail!("Unknown command '{}'\n\n{}", other, USAGE),
    }
}

/// The cookie jar saved by the previous run. An unreadable jar is replaced.
fn open_cookies(config: &Config) -> Result<CookieFile> {
    let path = config.cookies_path()?;
    match CookieFile::open(&path) {
        Ok(cookies) => Ok(cookies),
        Err(StorageError::Io(e)) => {
            Err(e).with_context(|| format!("Failed to open {}", path.display()))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Discarding unreadable cookie jar");
            let _ = std::fs::remove_file(&path);
            CookieFile::open(&path).with_context(|| format!("Failed to open {}", path.display()))
        }
    }
}

/// Client, credential store and controller, with any stored session restored
async fn build_view(config: &Config, cookies: &CookieFile) -> Result<ViewController> {
    let base_url = config.base_url();
    let api = ApiClient::with_cookies(&base_url, cookies.store()).context("Invalid API URL")?;
    let storage_path = config.storage_path()?;
    let storage = FileStorage::open(&storage_path)
        .with_context(|| format!("Failed to open {}", storage_path.display()))?;

    // The server sets the CSRF cookie on its first response; a saved jar may
    // already hold it
    if api.csrf_token().is_none() && !api.prime_csrf().await {
        debug!(url = %base_url, "No CSRF cookie from server");
    }

    let mut view = ViewController::new(api, Box::new(storage));
    let state = view.init().await;
    info!(url = %base_url, authenticated = state.is_authenticated(), "EV Spot client ready");
    Ok(view)
}

async fn login(view: &mut ViewController, config: &mut Config, args: &[String]) -> Result<()> {
    let username = match args.first() {
        Some(name) => name.clone(),
        None => prompt_line("Username", config.last_username.as_deref())?,
    };
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;

    let form = FormData::new()
        .with(elements::LOGIN_USERNAME, username.as_str())
        .with(elements::LOGIN_PASSWORD, password);
    view.dispatch(elements::LOGIN_FORM, UiEvent::Submit(form)).await;
    report(view)?;

    config.last_username = Some(username);
    config.save().context("Failed to save config")?;
    Ok(())
}

async fn register(view: &mut ViewController, args: &[String]) -> Result<()> {
    let (Some(username), Some(email)) = (args.first(), args.get(1)) else {
        bail!("Usage: evspot register <username> <email>");
    };
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;
    let confirm =
        rpassword::prompt_password("Confirm password: ").context("Failed to read password")?;

    let form = FormData::new()
        .with(elements::REGISTER_USERNAME, username.as_str())
        .with(elements::REGISTER_EMAIL, email.as_str())
        .with(elements::REGISTER_PASSWORD, password)
        .with(elements::REGISTER_PASSWORD_CONFIRM, confirm);
    view.dispatch(elements::REGISTER_FORM, UiEvent::Submit(form)).await;
    report(view)
}

async fn nearby(view: &mut ViewController, args: &[String]) -> Result<()> {
    let (Some(lat), Some(lng)) = (args.first(), args.get(1)) else {
        bail!("Usage: evspot nearby <lat> <lng> [radius]");
    };
    let center = LatLng {
        lat: lat.parse().with_context(|| format!("Invalid latitude '{}'", lat))?,
        lng: lng.parse().with_context(|| format!("Invalid longitude '{}'", lng))?,
    };
    if let Some(radius) = args.get(2) {
        let radius: u32 = match radius.trim().parse() {
            Ok(r) if r > 0 => r,
            _ => bail!("Invalid radius '{}', expected whole kilometres", radius),
        };
        view.dispatch(elements::SEARCH_RADIUS, UiEvent::Input(radius.to_string()))
            .await;
    }

    view.search_nearby(center).await;
    print_target(view, elements::STATION_LIST)
}

async fn station_action(view: &mut ViewController, args: &[String], button: &str) -> Result<()> {
    let Some(id) = args.first() else {
        bail!("A station id is required");
    };
    view.select_station(StationId::new(id.as_str()));
    view.dispatch(button, UiEvent::Click).await;
    report(view)
}

fn print_map() -> Result<()> {
    let map = MapWidget::init();
    println!("{}", serde_json::to_string_pretty(&map)?);
    eprintln!("Center tile: {}", map.center_tile_url());
    Ok(())
}

/// Print a render target. A failure alert takes its place.
fn print_target(view: &ViewController, element: &str) -> Result<()> {
    if let Some(alert) = view.page().alert() {
        if alert.kind == AlertKind::Danger {
            bail!("{}", alert.message);
        }
    }
    match view.page().text(element) {
        Some(text) => println!("{}", text),
        None => println!("(nothing to show)"),
    }
    Ok(())
}

/// Print the page's alert; danger and warning alerts become errors
fn report(view: &ViewController) -> Result<()> {
    match view.page().alert() {
        Some(alert) if matches!(alert.kind, AlertKind::Danger | AlertKind::Warning) => {
            bail!("{}", alert.message)
        }
        Some(alert) => {
            println!("{}", alert.message);
            Ok(())
        }
        None => Ok(()),
    }
}

fn prompt_line(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(value) => print!("{} [{}]: ", label, value),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let line = line.trim();
    match (line.is_empty(), default) {
        (true, Some(value)) => Ok(value.to_string()),
        _ => Ok(line.to_string()),
    }
}
