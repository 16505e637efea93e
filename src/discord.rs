use std::time::Duration;

use poise::serenity_prelude as serenity;

use crate::{
    quiz::{session::Ballot, Label, QuestionData},
    Context,
};

const QUIZ_COLOUR: serenity::Colour = serenity::Colour(0x00ff00);
const INFO_COLOUR: serenity::Colour = serenity::Colour(0x3498db);

/// Discord rejects messages and embed parts longer than these.
pub(crate) const MESSAGE_LIMIT: usize = 2000;
const TITLE_LIMIT: usize = 256;
const DESCRIPTION_LIMIT: usize = 4096;
const FIELD_LIMIT: usize = 1024;

/// Cuts `text` down to at most `limit` characters, marking the cut with an ellipsis.
pub(crate) fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let mut cut: String = text.chars().take(limit.saturating_sub(1)).collect();
    cut.push('\u{2026}');
    cut
}

/// Human readable length of the voting window, e.g. "10 minutes".
pub(crate) fn describe_window(window: Duration) -> String {
    let secs = window.as_secs();
    match secs {
        60 => "1 minute".to_string(),
        s if s > 0 && s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "1 second".to_string(),
        s => format!("{} seconds", s),
    }
}

pub(crate) fn info_embed(title: &str, description: &str, footer: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(truncate(title, TITLE_LIMIT))
        .description(truncate(description, DESCRIPTION_LIMIT))
        .colour(INFO_COLOUR)
        .footer(serenity::CreateEmbedFooter::new(footer))
}

pub(crate) fn quiz_embed(question: &QuestionData, window: Duration) -> serenity::CreateEmbed {
    let description = format!(
        "Quiz ends in {}!\n{}",
        describe_window(window),
        question.prompt()
    );
    let markers = Label::ALL.map(|label| label.to_string());

    question.options().iter().fold(
        serenity::CreateEmbed::new()
            .title("\u{1f4e2} Quiz Time!")
            .description(truncate(&description, DESCRIPTION_LIMIT))
            .colour(QUIZ_COLOUR)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "React with {}, {}, or {} to answer!",
                markers[0], markers[1], markers[2]
            ))),
        |embed, option| {
            embed.field(
                "Option:",
                truncate(&option.to_string(), FIELD_LIMIT),
                false,
            )
        },
    )
}

/// Shows the typing indicator in the invoking channel until dropped.
pub(crate) fn typing(ctx: Context<'_>) -> serenity::Typing {
    ctx.channel_id().start_typing(&ctx.serenity_context().http)
}

/// Votes cast as reactions on the published quiz message.
pub(crate) struct ReactionBallot<'a> {
    ctx: Context<'a>,
    message: serenity::Message,
}

impl<'a> ReactionBallot<'a> {
    pub(crate) fn new(ctx: Context<'a>, message: serenity::Message) -> Self {
        Self { ctx, message }
    }
}

impl Ballot for ReactionBallot<'_> {
    type Error = serenity::Error;

    async fn place_markers(&mut self, labels: &[Label]) -> Result<(), Self::Error> {
        for label in labels {
            self.message
                .react(
                    self.ctx.serenity_context(),
                    serenity::ReactionType::Unicode(label.emoji().to_string()),
                )
                .await?;
        }
        Ok(())
    }

    async fn raw_counts(&mut self) -> Result<Vec<(Label, u64)>, Self::Error> {
        log::debug!("Fetching reactions for message {}", self.message.id);
        self.message = self
            .message
            .channel_id
            .message(self.ctx.serenity_context(), self.message.id)
            .await?;

        Ok(label_counts(&self.message.reactions))
    }
}

/// Counts for the reactions that are quiz labels, in message order.
fn label_counts(reactions: &[serenity::MessageReaction]) -> Vec<(Label, u64)> {
    reactions
        .iter()
        .filter_map(|reaction| match &reaction.reaction_type {
            serenity::ReactionType::Unicode(emoji) => {
                Label::from_emoji(emoji).map(|label| (label, reaction.count))
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_kept() {
        assert_eq!(truncate("print('hi')", 20), "print('hi')");
    }

    #[test]
    fn long_text_is_cut_on_char_boundary() {
        let text = "\u{1f40d}".repeat(10);
        let cut = truncate(&text, 5);

        assert_eq!(cut.chars().count(), 5);
        assert!(cut.ends_with('\u{2026}'));
        assert!(cut.starts_with("\u{1f40d}\u{1f40d}\u{1f40d}\u{1f40d}"));
    }

    #[test]
    fn window_descriptions() {
        assert_eq!(describe_window(Duration::from_secs(600)), "10 minutes");
        assert_eq!(describe_window(Duration::from_secs(60)), "1 minute");
        assert_eq!(describe_window(Duration::from_secs(90)), "90 seconds");
        assert_eq!(describe_window(Duration::from_secs(1)), "1 second");
        assert_eq!(describe_window(Duration::from_secs(0)), "0 seconds");
    }

    #[test]
    fn quiz_embed_lists_labeled_options() {
        let question = QuestionData::new(
            "What is 2+2?".to_string(),
            ["3".to_string(), "5".to_string(), "4".to_string()],
            Label::Three,
        );

        let embed = serde_json::to_value(quiz_embed(&question, Duration::from_secs(600))).unwrap();

        assert_eq!(embed["description"], "Quiz ends in 10 minutes!\nWhat is 2+2?");
        let values: Vec<&str> = embed["fields"]
            .as_array()
            .unwrap()
            .iter()
            .map(|field| field["value"].as_str().unwrap())
            .collect();
        assert_eq!(
            values,
            vec![
                "1\u{fe0f}\u{20e3} 3",
                "2\u{fe0f}\u{20e3} 5",
                "3\u{fe0f}\u{20e3} 4"
            ]
        );
        assert_eq!(
            embed["footer"]["text"],
            "React with 1\u{fe0f}\u{20e3}, 2\u{fe0f}\u{20e3}, or 3\u{fe0f}\u{20e3} to answer!"
        );
    }

    #[test]
    fn info_embed_truncates_long_replies() {
        let reply = "x".repeat(DESCRIPTION_LIMIT + 100);
        let embed = serde_json::to_value(info_embed("Python challenge!", &reply, "footer")).unwrap();

        let description = embed["description"].as_str().unwrap();
        assert_eq!(description.chars().count(), DESCRIPTION_LIMIT);
    }

    #[test]
    fn quiz_embed_truncates_long_options() {
        let question = QuestionData::new(
            "Which one?".to_string(),
            ["a".repeat(1500), "b".to_string(), "c".to_string()],
            Label::Two,
        );

        let embed = serde_json::to_value(quiz_embed(&question, Duration::from_secs(600))).unwrap();

        let first = embed["fields"][0]["value"].as_str().unwrap();
        assert_eq!(first.chars().count(), FIELD_LIMIT);
        assert!(first.starts_with("1\u{fe0f}\u{20e3} aaa"));
        assert_eq!(embed["fields"][1]["value"], "2\u{fe0f}\u{20e3} b");
    }

    fn reaction(emoji: serde_json::Value, count: u64) -> serde_json::Value {
        serde_json::json!({
            "count": count,
            "count_details": {"burst": 0, "normal": count},
            "me": true,
            "me_burst": false,
            "burst_colors": [],
            "emoji": emoji,
        })
    }

    #[test]
    fn only_label_reactions_are_counted() {
        let reactions: Vec<serenity::MessageReaction> = serde_json::from_value(
            serde_json::json!([
                reaction(serde_json::json!({"id": null, "name": "\u{1f44d}"}), 3),
                reaction(serde_json::json!({"id": null, "name": "2\u{fe0f}\u{20e3}"}), 2),
                reaction(
                    serde_json::json!({"id": "123456789012345678", "name": "snek", "animated": false}),
                    7
                ),
                reaction(serde_json::json!({"id": null, "name": "1\u{fe0f}\u{20e3}"}), 4),
            ]),
        )
        .unwrap();

        assert_eq!(
            label_counts(&reactions),
            vec![(Label::Two, 2), (Label::One, 4)]
        );
    }
}
