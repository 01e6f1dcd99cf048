use anyhow::{anyhow, Context, Result};
use promptlab_app::{telemetry, AppConfig, MemoryStore, ScenarioAutogenerator};
use std::path::PathBuf;
use std::sync::Arc;

const USAGE: &str = r#"Usage: autogen <experiment-id> [--data <PATH>]

Generates one new test scenario for the experiment and prints it as JSON.

Store snapshot resolution order:
  1) --data <PATH>
  2) Env: PROMPTLAB_DATA
  3) data_path in the PromptLab config file

Env: OPENAI_API_KEY, PROMPTLAB_MODEL, PROMPTLAB_BASE_URL, PROMPTLAB_MAX_EXAMPLES,
     PROMPTLAB_LOG_JSON, RUST_LOG
"#;

struct Args {
    experiment_id: String,
    data_path: Option<PathBuf>,
}

fn parse_args() -> Result<Option<Args>> {
    let mut experiment_id = None;
    let mut data_path = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(None),
            "--data" => {
                let path = args.next().ok_or_else(|| anyhow!("--data needs a path"))?;
                data_path = Some(PathBuf::from(path));
            }
            other if other.starts_with("--") => return Err(anyhow!("unknown flag: {}", other)),
            other => experiment_id = Some(other.to_string()),
        }
    }

    let experiment_id = experiment_id.ok_or_else(|| anyhow!("missing <experiment-id>\n\n{}", USAGE))?;
    Ok(Some(Args {
        experiment_id,
        data_path,
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    let Some(args) = parse_args()? else {
        println!("{}", USAGE);
        return Ok(());
    };

    let config = AppConfig::load().context("load config")?;
    telemetry::init_tracing(config.log_json);

    let data_path = args
        .data_path
        .or_else(|| config.data_path.clone())
        .ok_or_else(|| anyhow!("no store snapshot given (use --data or PROMPTLAB_DATA)"))?;
    let store = MemoryStore::load(&data_path)
        .with_context(|| format!("load store snapshot {}", data_path.display()))?;
    let client = config.completion_client().context("build completion client")?;

    let generator = ScenarioAutogenerator::new(Arc::new(store), Arc::new(client))
        .with_config(config.autogen());
    let generated = generator
        .generate(&args.experiment_id)
        .await
        .context("generate scenario")?;

    println!("{}", serde_json::to_string_pretty(&generated)?);
    Ok(())
}
