mod play;

use clap::Parser;
use tokio::signal;

#[derive(Parser, Debug)]
#[command(
    name = "tmux-dash",
    version,
    about = "Lay out tmux windows and panes from a YAML dashboard config"
)]
struct Cli {
    #[command(flatten)]
    play: play::PlayArgs,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    // tmux calls block, so the layout runs off the async threads and races
    // the interrupt handler.
    let layout = tokio::task::spawn_blocking(move || play::run(cli.play));

    tokio::select! {
        joined = layout => match joined {
            Ok(Ok(summary)) => {
                log::info!(
                    "Configured {} windows and {} panes",
                    summary.windows,
                    summary.panes
                );
                for degradation in &summary.degradations {
                    log::info!("Fallback taken: {:?}", degradation);
                }
            }
            Ok(Err(e)) => {
                eprintln!("tmux-dash: {}", e);
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("tmux-dash: layout task failed: {}", e);
                std::process::exit(1);
            }
        },
        _ = shutdown_signal() => {
            println!("Signal received, exiting...");
            // The blocking task cannot be cancelled; leave without joining it.
            std::process::exit(0);
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::PathBuf;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_short_flags() {
        let cli = Cli::try_parse_from(["tmux-dash", "-c", "/tmp/dash.yml", "-n", "work"]).unwrap();
        assert_eq!(cli.play.config, Some(PathBuf::from("/tmp/dash.yml")));
        assert_eq!(cli.play.session_name.as_deref(), Some("work"));
        assert_eq!(cli.play.session_id, None);
    }

    #[test]
    fn test_parse_long_flags() {
        let cli = Cli::try_parse_from([
            "tmux-dash",
            "--config",
            "dash.yml",
            "--session-id",
            "$4",
            "--module-dir",
            "/opt/mods",
        ])
        .unwrap();
        assert_eq!(cli.play.session_id.as_deref(), Some("$4"));
        assert_eq!(cli.play.module_dir, Some(PathBuf::from("/opt/mods")));
    }

    #[test]
    fn test_session_id_and_name_conflict() {
        let err = Cli::try_parse_from(["tmux-dash", "-i", "$1", "-n", "work"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
