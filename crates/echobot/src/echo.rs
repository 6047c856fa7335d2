//! Reply rules, kept free of I/O.

use slackbot::{Event, User};

/// What the bot should do with one event.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    /// Post `text` to `channel`.
    Post { channel: String, text: String },
    /// Answer a slash command through its response URL.
    Respond { response_url: String, text: String, visible: bool },
    Ignore,
}

/// Decide the reply for `event`.
///
/// `mention` is the bot's `<@ID>` prefix and `author` the cached sender.
/// Messages from bots are ignored so two echo bots cannot loop.
pub fn reply_to(event: &Event, mention: &str, author: Option<&User>) -> Reply {
    if event.is_slash_command() {
        if event.response_url.is_empty() {
            return Reply::Ignore;
        }
        return Reply::Respond {
            response_url: event.response_url.clone(),
            text: format!("{} {}", event.command, event.text).trim_end().to_owned(),
            visible: true,
        };
    }

    if event.is_from_bot() || author.is_some_and(|u| u.is_bot) {
        return Reply::Ignore;
    }
    if !(event.is_message() || event.is_app_mention()) || !event.subtype.is_empty() {
        return Reply::Ignore;
    }

    let Some(body) = strip_mention(event, mention) else {
        return Reply::Ignore;
    };
    let who = author.map(|u| u.name.as_str()).unwrap_or(event.user_id.as_str());
    Reply::Post {
        channel: event.channel.clone(),
        text: format!("Hi, {who}: {}", body.trim()),
    }
}

/// Text after the bot's mention.  `app_mention` events are addressed to
/// the bot by definition, so any leading `<@…>` is accepted there.
fn strip_mention<'a>(event: &'a Event, mention: &str) -> Option<&'a str> {
    if mention != "<@>" {
        if let Some(body) = event.text.strip_prefix(mention) {
            return Some(body);
        }
    }
    if event.is_app_mention() {
        let rest = event.text.strip_prefix("<@")?;
        return rest.split_once('>').map(|(_, body)| body);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use slackbot::EventType;

    fn mention(text: &str) -> Event {
        Event {
            event_type: EventType::AppMention,
            channel: "C1".into(),
            user_id: "U1".into(),
            text: text.into(),
            ..Default::default()
        }
    }

    fn ana() -> User {
        User {
            id: "U1".into(),
            name: "ana".into(),
            ..Default::default()
        }
    }

    #[test]
    fn mention_is_echoed_with_sender_name() {
        let reply = reply_to(&mention("<@UBOT> good morning"), "<@UBOT>", Some(&ana()));
        assert_eq!(
            reply,
            Reply::Post {
                channel: "C1".into(),
                text: "Hi, ana: good morning".into()
            }
        );
    }

    #[test]
    fn unknown_sender_falls_back_to_id() {
        let reply = reply_to(&mention("<@UBOT> yo"), "<@UBOT>", None);
        assert!(matches!(reply, Reply::Post { text, .. } if text == "Hi, U1: yo"));
    }

    #[test]
    fn app_mention_works_without_known_bot_id() {
        let reply = reply_to(&mention("<@UOTHER> hey"), "<@>", Some(&ana()));
        assert!(matches!(reply, Reply::Post { text, .. } if text == "Hi, ana: hey"));
    }

    #[test]
    fn message_without_mention_is_ignored() {
        let mut event = mention("just chatting");
        event.event_type = EventType::Message;
        assert_eq!(reply_to(&event, "<@UBOT>", Some(&ana())), Reply::Ignore);
    }

    #[test]
    fn bots_are_ignored() {
        let mut event = mention("<@UBOT> hi");
        event.bot_id = "B2".into();
        assert_eq!(reply_to(&event, "<@UBOT>", None), Reply::Ignore);

        let bot_user = User {
            is_bot: true,
            ..ana()
        };
        assert_eq!(
            reply_to(&mention("<@UBOT> hi"), "<@UBOT>", Some(&bot_user)),
            Reply::Ignore
        );
    }

    #[test]
    fn edits_are_ignored() {
        let mut event = mention("<@UBOT> hi");
        event.event_type = EventType::Message;
        event.subtype = "message_changed".into();
        assert_eq!(reply_to(&event, "<@UBOT>", Some(&ana())), Reply::Ignore);
    }

    #[test]
    fn slash_command_is_answered_in_channel() {
        let event = Event {
            event_type: EventType::SlashCommand,
            command: "/echo".into(),
            text: "ping".into(),
            response_url: "https://hooks.slack.com/commands/1".into(),
            ..Default::default()
        };
        assert_eq!(
            reply_to(&event, "<@UBOT>", None),
            Reply::Respond {
                response_url: "https://hooks.slack.com/commands/1".into(),
                text: "/echo ping".into(),
                visible: true
            }
        );
    }
}
