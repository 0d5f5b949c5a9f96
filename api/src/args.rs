use clap::Parser;
use nutrilens_core::domain::common::{
    CoachConfig, LlmConfig, NutriLensConfig, NutritionDbConfig,
};

#[derive(Debug, Clone, Parser)]
#[command(name = "nutrilens-api", about = "Image nutrition analysis and meal coaching API")]
pub struct Args {
    #[command(flatten)]
    pub server: ServerArgs,

    #[command(flatten)]
    pub llm: LlmArgs,

    #[command(flatten)]
    pub nutrition: NutritionArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ServerArgs {
    #[arg(long, env = "APP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "APP_PORT", default_value_t = 8000)]
    pub port: u16,

    #[arg(long, env = "ROOT_PATH", default_value = "")]
    pub root_path: String,

    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',', default_value = "*")]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct LlmArgs {
    /// Startup fails when the key is absent.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: String,

    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-2.5-flash")]
    pub gemini_model: String,

    /// Attach a coach recommendation to each successful analysis.
    #[arg(
        long,
        env = "COACH_ENABLED",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub coach_enabled: bool,
}

#[derive(Debug, Clone, clap::Args)]
pub struct NutritionArgs {
    /// Startup fails when the key is absent.
    #[arg(long, env = "USDA_FDC_KEY", hide_env_values = true)]
    pub fdc_api_key: String,
}

#[derive(Debug, Clone, clap::Args)]
pub struct LogArgs {
    #[arg(
        long,
        env = "RUST_LOG",
        default_value = "nutrilens_api=debug,nutrilens_core=debug,tower_http=info"
    )]
    pub log_filter: String,

    /// "json" switches to structured JSON logs.
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: String,
}

impl From<Args> for NutriLensConfig {
    fn from(args: Args) -> Self {
        NutriLensConfig {
            llm: LlmConfig {
                gemini_api_key: args.llm.gemini_api_key,
                gemini_model: args.llm.gemini_model,
            },
            nutrition: NutritionDbConfig {
                fdc_api_key: args.nutrition.fdc_api_key,
            },
            coach: CoachConfig {
                enabled: args.llm.coach_enabled,
            },
        }
    }
}
