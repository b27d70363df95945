use chartsheet::access::{Access, Route, check_access};
use chartsheet::admin::{AdminView, role_action_label};
use chartsheet::analyze::AnalyzeView;
use chartsheet::auth;
use chartsheet::backend::RegisterRequest;
use chartsheet::export::{download_pdf, download_png};
use chartsheet::history::HistoryView;
use chartsheet::pipeline::uses_scene;
use chartsheet::session::FileSessionStore;
use chartsheet::sheet::display_value;
use chartsheet::upload::UploadForm;
use chartsheet::{AppContext, ChartType, ClientConfig, HttpBackend};
use std::env;
use std::error::Error;
use std::path::Path;

const USAGE: &str = "Usage:
  chartsheet login <email> <password>
  chartsheet register <username> <email> <password>
  chartsheet logout
  chartsheet upload <file.xlsx>
  chartsheet history
  chartsheet analyze <fileId> <sheet> <x> <y> <Bar|Line|Pie|3DColumn> [--png|--pdf] [--summary]
  chartsheet admin-users";

const SNAPSHOT_SIZE: (u32, u32) = (800, 600);

/// Print why `route` cannot be opened. Returns `true` when it can.
fn allowed(route: &Route, ctx: &AppContext) -> bool {
    match check_access(route, ctx) {
        Access::Allow => true,
        Access::Redirect(Route::Login) => {
            eprintln!("Not logged in. Run `chartsheet login <email> <password>` first.");
            false
        }
        Access::Redirect(to) => {
            eprintln!("You do not have access to {} (redirected to {}).", route, to);
            false
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("{}", USAGE);
        return Ok(());
    }

    let config = ClientConfig::from_env();
    let store = FileSessionStore::new(&config.session_path);
    let backend = HttpBackend::new(&config)?;
    let mut ctx = AppContext::init(&store);

    match (args[1].as_str(), &args[2..]) {
        ("login", [email, password]) => {
            match auth::login(&mut ctx, &backend, &store, email, password).await {
                Ok(_) => println!("Logged in as {}.", ctx.user().map_or("", |u| u.username.as_str())),
                Err(e) => eprintln!("{}", e.user_message()),
            }
        }
        ("register", [username, email, password]) => {
            let request = RegisterRequest {
                username: username.clone(),
                email: email.clone(),
                password: password.clone(),
            };
            match auth::register(&mut ctx, &backend, &store, &request).await {
                Ok(_) => println!("Registered and logged in as {}.", username),
                Err(e) => eprintln!("{}", e.user_message()),
            }
        }
        ("logout", []) => {
            auth::logout(&mut ctx, &store)?;
            println!("Logged out.");
        }
        ("upload", [path]) => {
            if !allowed(&Route::Upload, &ctx) {
                return Ok(());
            }
            let mut form = UploadForm::new();
            form.select_path(Path::new(path))?;
            form.submit(&ctx, &backend).await;
            println!("{}", form.message);
        }
        ("history", []) => {
            if !allowed(&Route::History, &ctx) {
                return Ok(());
            }
            let mut history = HistoryView::new();
            history.refresh(&ctx, &backend).await;
            if let Some(error) = &history.error {
                eprintln!("{}", error);
            } else if history.is_empty() {
                println!("No files uploaded yet.");
            }
            for file in history.entries() {
                println!("{}  {}", file.id, file.caption());
                for sheet in &file.sheet_names {
                    println!("    - {}", sheet);
                }
            }
        }
        ("analyze", [file_id, sheet, x, y, chart_type, flags @ ..]) => {
            let route = Route::Analyze(file_id.clone());
            if !allowed(&route, &ctx) {
                return Ok(());
            }
            let chart_type: ChartType = chart_type.parse()?;

            let mut view = AnalyzeView::new(file_id);
            if let Some(next) = view.load(&ctx, &backend).await {
                println!("File has no sheets left; see `chartsheet history` ({}).", next);
                return Ok(());
            }
            if let Some(error) = &view.error {
                eprintln!("{}", error);
                return Ok(());
            }
            view.select_sheet(sheet);
            view.set_x_axis(x);
            view.set_y_axis(y);
            view.set_chart_type(chart_type);

            let chart = view.chart();
            println!("{} ({})", chart.options.title, chart_type);
            if let Some(message) = chart.placeholder() {
                println!("{}", message);
            } else if uses_scene(chart_type) {
                for bar in &chart.scene.bars {
                    println!(
                        "  {:>20}  {:>12}  height {:.2} at x {:.1}",
                        display_value(&bar.label),
                        bar.value,
                        bar.height,
                        bar.x
                    );
                }
            } else {
                for point in chart.series.points() {
                    println!("  {:>20}  {:>12}", display_value(&point.label), point.value);
                }
            }

            let dir = env::current_dir()?;
            for flag in flags {
                match flag.as_str() {
                    "--png" | "--pdf" => {
                        let snapshot = view.snapshot(SNAPSHOT_SIZE.0, SNAPSHOT_SIZE.1)?;
                        let saved = if flag == "--png" {
                            download_png(snapshot.as_ref(), &dir)?
                        } else {
                            download_pdf(snapshot.as_ref(), &dir)?
                        };
                        match saved {
                            Some(path) => println!("Saved {}", path.display()),
                            None => println!("Nothing to export."),
                        }
                    }
                    "--summary" => {
                        view.request_summary(&ctx, &backend).await;
                        println!("\nAI summary:\n{}", view.ai_summary);
                    }
                    other => eprintln!("Unknown option {}", other),
                }
            }
        }
        ("admin-users", []) => {
            let mut admin = match AdminView::open(&ctx) {
                Ok(admin) => admin,
                Err(_) => {
                    allowed(&Route::Admin, &ctx);
                    return Ok(());
                }
            };
            admin.refresh(&ctx, &backend).await;
            if let Some(error) = &admin.error {
                eprintln!("{}", error);
            }
            for user in admin.users() {
                let action = if admin.can_manage(&user.id) {
                    role_action_label(user.role)
                } else {
                    "(you)"
                };
                println!(
                    "{}  {:<20} {:<30} {:<6} {}",
                    user.id,
                    user.username,
                    user.email,
                    user.role.as_str(),
                    action
                );
            }
        }
        _ => eprintln!("{}", USAGE),
    }

    Ok(())
}
