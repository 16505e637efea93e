use std::fmt::Display;

use crate::{completion::OpenAiClient, discord, Context, Data, Error, Result, RngImpl};

pub mod info;
pub mod quiz;
pub mod tutor;

pub(crate) const POWERED_BY: &str = "Powered by OpenAI";

pub fn all() -> Vec<poise::Command<Data<OpenAiClient, RngImpl>, Error>> {
    vec![
        quiz::quiz(),
        tutor::challenge(),
        tutor::explain(),
        tutor::answer(),
        info::directory(),
        info::pythonbot(),
    ]
}

/// Tells the user a generation failed. The invocation ends here.
pub(crate) async fn report_failure(ctx: Context<'_>, what: &str, error: impl Display) -> Result<()> {
    log::warn!("Failed to generate {}: {}", what, error);
    ctx.say(failure_message(what, error)).await?;
    Ok(())
}

/// Cut to fit a single Discord message.
fn failure_message(what: &str, error: impl Display) -> String {
    discord::truncate(
        &format!("Sorry, I couldn't generate {} due to an error: {}", what, error),
        discord::MESSAGE_LIMIT,
    )
}

/// Trailing command text, if there is any besides whitespace.
pub(crate) fn rest_text(rest: Option<String>) -> Option<String> {
    rest.map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;
    use crate::completion::CompletionError;

    #[test]
    fn blank_rest_is_none() {
        assert_eq!(rest_text(None), None);
        assert_eq!(rest_text(Some("   ".to_string())), None);
        assert_eq!(
            rest_text(Some("  decorators ".to_string())),
            Some("decorators".to_string())
        );
    }

    #[test]
    fn commands_are_registered_in_order() {
        let names: Vec<String> = all().into_iter().map(|command| command.name).collect();

        assert_eq!(
            names,
            vec!["quiz", "challenge", "explain", "answer", "directory", "pythonbot"]
        );
    }

    #[test]
    fn failure_message_fits_one_message() {
        let short = failure_message("a challenge", CompletionError::EmptyResponse);
        assert_eq!(
            short,
            "Sorry, I couldn't generate a challenge due to an error: \
             Completion service returned no content"
        );

        let gateway_page = CompletionError::Api {
            status: StatusCode::BAD_GATEWAY,
            body: format!("<html>{}</html>", "<p>upstream down</p>".repeat(200)),
        };
        let long = failure_message("a quiz", gateway_page);

        assert_eq!(long.chars().count(), discord::MESSAGE_LIMIT);
        assert!(long.starts_with("Sorry, I couldn't generate a quiz due to an error: Completion service returned 502 Bad Gateway: <html>"));
        assert!(long.ends_with('\u{2026}'));
    }
}
