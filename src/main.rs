use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};

use feedback_form::config::FormConfig;
use feedback_form::errors::FormError;
use feedback_form::form::{Controls, FormContext, FormEvent};
use feedback_form::services::driver::FormDriver;

/// Прогоняет JSON-события (по одному на строку) из stdin через форму
/// и печатает итоговое состояние формы.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Err(err) = run().await {
        log::error!("form replay failed: {}", err);
        match serde_json::to_string(&err.to_response()) {
            Ok(body) => println!("{}", body),
            Err(_) => println!("{}", err),
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<(), FormError> {
    let config = FormConfig::from_env()?;
    log::info!(
        "Starting form replay (processing delay {:?}, success notice {:?})",
        config.processing_delay(),
        config.success_notice_delay()
    );

    let mut driver = FormDriver::new(FormContext::new(config, Controls::complete()));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<FormEvent>(line) {
            Ok(event) => {
                let effects = driver.handle(event);
                if !effects.is_empty() {
                    log::debug!("effects: {}", serde_json::to_string(&effects)?);
                }
            }
            Err(err) => log::warn!("skipping malformed event {:?}: {}", line, err),
        }
    }

    driver.settle().await;

    let view = driver.context().view();
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}
