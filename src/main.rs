mod commands;
mod completion;
mod config;
mod discord;
mod quiz;
mod tutor;

use dotenvy::dotenv;
use poise::{serenity_prelude as serenity, FrameworkError};
use rand::{Rng, SeedableRng};
use rand_hc::Hc128Rng;
use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};

use crate::{
    completion::{CompletionService, OpenAiClient},
    config::{Config, OrExit},
};

// User data, which is stored and accessible in all command invocations
pub(crate) struct Data<C, R>
where
    C: CompletionService,
    R: Rng,
{
    completion: C,
    rng: Mutex<R>,
    quiz_window: Duration,
}

impl<C: CompletionService, R: Rng> Data<C, R> {
    /// Runs `f` with the shared rng locked.
    pub(crate) fn with_rng<T>(&self, f: impl FnOnce(&mut R) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut rng)
    }
}

type RngImpl = Hc128Rng;
type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data<OpenAiClient, RngImpl>, Error>;
type Result<T> = core::result::Result<T, Error>;

async fn handle_error(error: FrameworkError<'_, Data<OpenAiClient, RngImpl>, Error>) {
    log::error!("Error: {}", error);
    match error.ctx() {
        Some(ctx) => {
            match ctx.say(format!("Error: {}", error)).await {
                Ok(_) => (),
                Err(e) => log::error!("Error sending error message: {}", e),
            };
        }
        None => (),
    }
}

#[tokio::main]
async fn main() {
    // Load values from .env, if available.
    dotenv().ok();
    pretty_env_logger::init();

    let config = Config::from_env().or_exit();
    log::debug!("Loaded {:?}", config);

    let completion = OpenAiClient::from_config(&config).or_exit();
    let quiz_window = config.quiz_window;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some("!".into()),
                ..Default::default()
            },
            on_error: |error| Box::pin(handle_error(error)),
            ..Default::default()
        })
        .setup(move |_ctx, ready, _framework| {
            Box::pin(async move {
                log::info!("Connected to Discord as {}!", ready.user.name);

                Ok(Data {
                    completion,
                    rng: Mutex::new(Hc128Rng::from_entropy()),
                    quiz_window,
                })
            })
        })
        .build();

    // Prefix commands need to read message content.
    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    log::info!("Connecting to Discord...");
    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await
        .or_exit();

    client.start().await.or_exit();
}
