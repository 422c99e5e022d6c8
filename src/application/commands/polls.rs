//! Poll chat commands: startpoll, vote, listpolls, pollinfo

use once_cell::sync::Lazy;
use regex_lite::Regex;
use std::sync::Arc;

use crate::application::errors::CommandError;
use crate::application::services::CommandService;
use crate::domain::entities::{Command, CommandResult, Message, Poll, PollData, DEFAULT_POLL_SECONDS};
use crate::domain::traits::PollStore;

pub const VOTE_PERMISSION: &str = "vote";
pub const START_POLL_PERMISSION: &str = "startpoll";
pub const LIST_POLLS_PERMISSION: &str = "listpolls";
pub const POLL_INFO_PERMISSION: &str = "pollinfo";

// `\w` is ASCII-only in regex-lite, so non-ASCII letters are allowed explicitly
static RE_POLL_INFO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<title>.+)\[(?P<options>[\w\s,\x{80}-\x{10FFFF}]+)\]\s*(?P<time>[0-9.]*)")
        .expect("poll pattern is valid")
});

/// Title, choices and duration parsed from `startpoll` arguments
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPoll {
    pub title: String,
    pub choices: Vec<String>,
    pub seconds: f64,
}

/// Parse `<title> [choice, choice, ...] seconds`. The duration is optional
/// and falls back to [`DEFAULT_POLL_SECONDS`].
pub fn parse_poll_data(text: &str) -> Option<ParsedPoll> {
    let caps = RE_POLL_INFO.captures(text)?;

    let title = caps.name("title")?.as_str().trim().to_string();
    let choices = caps.name("options")?
        .as_str()
        .split(',')
        .map(|s| s.trim().to_string())
        .collect();
    let seconds = caps.name("time")
        .and_then(|t| t.as_str().parse::<f64>().ok())
        .unwrap_or(DEFAULT_POLL_SECONDS);

    Some(ParsedPoll { title, choices, seconds })
}

/// True for a non-empty run of ASCII digits: no sign, no point, no spaces
pub fn is_number(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn parse_number<T: std::str::FromStr>(value: &str) -> Option<T> {
    if is_number(value) {
        value.parse().ok()
    } else {
        None
    }
}

fn cast_to_int_or_error(value: &str) -> Result<u64, CommandError> {
    parse_number(value)
        .ok_or_else(|| CommandError::invalid_value(format!("{} is not a valid number", value)))
}

/// Handle `startpoll <title> [option1, option2, ...] seconds`
pub fn start_poll(store: &dyn PollStore, prefix: &str, msg: &Message, args: &[String]) -> CommandResult {
    if args.len() < 2 {
        return Err(CommandError::invalid_args("startpoll", "missing required poll arguments"));
    }

    let Some(parsed) = parse_poll_data(&args.join(" ")) else {
        return Err(CommandError::invalid_args(
            "startpoll",
            format!(
                "your poll commands seems to be improperly formatted, example: {}startpoll what should i eat? [apples, oranges, potatos]",
                prefix
            ),
        ));
    };

    let data = PollData::new(&msg.channel, &msg.author.id, parsed.title, parsed.seconds, parsed.choices);
    let poll = store.start(data)?;

    Ok(Some(format!(
        "poll #{} started: \"{}\" - choices: {} - vote with {}vote <choice_id> within {} seconds",
        poll.id,
        poll.title,
        poll.format_choices(),
        prefix,
        poll.seconds
    )))
}

/// Handle `vote <choice_id> (poll_id)`
pub fn vote(store: &dyn PollStore, prefix: &str, msg: &Message, args: &[String]) -> CommandResult {
    let Some(choice) = args.first() else {
        return Err(CommandError::invalid_args(
            "vote",
            "missing required vote arguments, must provide the id of the choice you want to vote for",
        ));
    };

    let count = store.get_active_channel_poll_count(&msg.channel);
    if count == 0 {
        return Ok(Some("there are NOT any active polls running right now to vote for".to_string()));
    }

    let poll = if count == 1 {
        match store.get_active_channel_polls(&msg.channel).into_iter().next() {
            Some(poll) => poll,
            None => return Ok(Some("there are NOT any active polls running right now to vote for".to_string())),
        }
    } else {
        if args.len() != 2 {
            return Err(CommandError::invalid_args(
                "vote",
                format!(
                    "there are multiple polls active, please specify the poll id, example: {}vote {} <POLL_ID>",
                    prefix, choice
                ),
            ));
        }

        let poll_id = cast_to_int_or_error(&args[1])?;
        store.get_channel_poll_by_id(&msg.channel, poll_id)
            .ok_or_else(|| CommandError::invalid_args("vote", format!("Could not find poll by ID {}", poll_id)))?
    };

    let Some(choice) = parse_number::<usize>(choice) else {
        return Err(CommandError::invalid_args("vote", format!("{} is not a valid number", choice)));
    };

    if !poll.is_valid_vote(choice) {
        return Ok(Some(format!(
            "{} is not a valid choice id for poll#{}, choices are: {}",
            choice,
            poll.id,
            poll.format_choices()
        )));
    }

    if poll.has_already_voted(&msg.author.id) {
        return Ok(None);
    }

    if store.add_vote(poll.id, &msg.author.id, choice)? {
        tracing::debug!("{} voted {} on poll #{}", msg.author.id, choice, poll.id);
    }
    Ok(None)
}

/// Handle `listpolls`
pub fn list_polls(store: &dyn PollStore, msg: &Message) -> CommandResult {
    let listing = store.get_active_channel_polls(&msg.channel)
        .iter()
        .map(|poll| format!("{} -> \"{}\"", poll.id, poll.title))
        .collect::<Vec<_>>()
        .join(" | ");

    Ok(Some(listing))
}

/// Handle `pollinfo (poll_id)`
pub fn poll_info(store: &dyn PollStore, prefix: &str, msg: &Message, args: &[String]) -> CommandResult {
    let count = store.get_active_channel_poll_count(&msg.channel);
    if count == 0 {
        return Ok(Some("there are not any polls active right now".to_string()));
    }

    if count > 1 && args.is_empty() {
        return Err(CommandError::invalid_args(
            "pollinfo",
            format!(
                "multiple polls are running, the poll id is required to be passed, example: {}pollinfo <POLL_ID>",
                prefix
            ),
        ));
    }

    let poll: Poll = if count == 1 {
        match store.get_active_channel_polls(&msg.channel).into_iter().next() {
            Some(poll) => poll,
            None => return Ok(Some("there are not any polls active right now".to_string())),
        }
    } else {
        let Some(poll_id) = parse_number::<u64>(&args[0]) else {
            return Err(CommandError::invalid_args("pollinfo", format!("{} is not valid number", args[0])));
        };

        store.get_channel_poll_by_id(&msg.channel, poll_id)
            .ok_or_else(|| CommandError::invalid_args("pollinfo", format!("could not find any poll by ID {}", args[0])))?
    };

    Ok(Some(format!(
        "POLL INFO #{} - title: \"{}\" - choices: {} - seconds left: {}",
        poll.id,
        poll.title,
        poll.format_choices(),
        poll.seconds_left()
    )))
}

/// Register the poll commands with the command service
pub fn register_poll_commands(commands: &mut CommandService, store: Arc<dyn PollStore>) {
    let prefix = commands.prefix().to_string();

    let (s, p) = (Arc::clone(&store), prefix.clone());
    commands.register(Command::new("startpoll")
        .with_usage("<title> [option1, option2, ect] seconds_for_poll")
        .with_description("starts a poll for the current channel")
        .with_permission(START_POLL_PERMISSION)
        .with_handler(move |msg, args| start_poll(s.as_ref(), &p, msg, args)));

    let (s, p) = (Arc::clone(&store), prefix.clone());
    commands.register(Command::new("vote")
        .with_usage("<choice_id> (poll_id)")
        .with_description("votes for a choice in an active poll")
        .with_permission(VOTE_PERMISSION)
        .with_handler(move |msg, args| vote(s.as_ref(), &p, msg, args)));

    let s = Arc::clone(&store);
    commands.register(Command::new("listpolls")
        .with_description("list all active polls")
        .with_permission(LIST_POLLS_PERMISSION)
        .with_handler(move |msg, _args| list_polls(s.as_ref(), msg)));

    let (s, p) = (store, prefix);
    commands.register(Command::new("pollinfo")
        .with_usage("(POLL_ID)")
        .with_description("views info about the poll using the passed poll id")
        .with_permission(POLL_INFO_PERMISSION)
        .with_handler(move |msg, args| poll_info(s.as_ref(), &p, msg, args)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::User;
    use crate::infrastructure::storage::MemoryPollStore;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn msg_from(author: &str, name: &str, list: &[&str]) -> Message {
        Message::from_command("#chan", User::new(author), name, args(list))
    }

    fn start(store: &MemoryPollStore, title: &str, seconds: f64) -> Poll {
        store.start(PollData::new(
            "#chan",
            "owner",
            title,
            seconds,
            vec!["cheese".to_string(), "pepperoni".to_string()],
        )).unwrap()
    }

    fn reason(err: CommandError) -> String {
        match err {
            CommandError::InvalidArgs { reason, .. } => reason,
            other => panic!("expected invalid args, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_poll_data() {
        let parsed = parse_poll_data("eat pizza [cheese, pepperoni] 60").unwrap();
        assert_eq!(parsed.title, "eat pizza");
        assert_eq!(parsed.choices, vec!["cheese", "pepperoni"]);
        assert_eq!(parsed.seconds, 60.0);
    }

    #[test]
    fn test_parse_poll_data_default_duration() {
        let parsed = parse_poll_data("eat pizza [cheese, pepperoni]").unwrap();
        assert_eq!(parsed.seconds, 30.0);

        let parsed = parse_poll_data("eat pizza [cheese, pepperoni] 1.2.3").unwrap();
        assert_eq!(parsed.seconds, 30.0);

        let parsed = parse_poll_data("eat pizza [cheese, pepperoni] 2.5").unwrap();
        assert_eq!(parsed.seconds, 2.5);
    }

    #[test]
    fn test_parse_poll_data_requires_choices() {
        assert!(parse_poll_data("eat pizza cheese, pepperoni 60").is_none());
        assert!(parse_poll_data("[cheese, pepperoni] 60").is_none());
    }

    #[test]
    fn test_parse_poll_data_non_ascii_choices() {
        let parsed = parse_poll_data("eat [jalapeño, queso] 60").unwrap();
        assert_eq!(parsed.title, "eat");
        assert_eq!(parsed.choices, vec!["jalapeño", "queso"]);
        assert_eq!(parsed.seconds, 60.0);

        let parsed = parse_poll_data("essen [käse, würstchen]").unwrap();
        assert_eq!(parsed.choices, vec!["käse", "würstchen"]);

        let parsed = parse_poll_data("昼ご飯 [ラーメン, 寿司] 30").unwrap();
        assert_eq!(parsed.title, "昼ご飯");
        assert_eq!(parsed.choices, vec!["ラーメン", "寿司"]);
    }

    #[test]
    fn test_is_number() {
        assert!(is_number("0"));
        assert!(is_number("42"));
        assert!(!is_number(""));
        assert!(!is_number("-1"));
        assert!(!is_number("1.5"));
        assert!(!is_number("+1"));
        assert!(!is_number(" 1"));
        assert!(!is_number("1a"));
    }

    #[test]
    fn test_start_poll() {
        let store = MemoryPollStore::new();
        let msg = msg_from("alice", "startpoll", &["eat", "pizza", "[cheese,", "pepperoni]", "60"]);

        let reply = start_poll(&store, "!", &msg, msg.args()).unwrap().unwrap();
        assert!(reply.starts_with("poll #1 started: \"eat pizza\""));

        let polls = store.get_active_channel_polls("#chan");
        assert_eq!(polls.len(), 1);
        assert_eq!(polls[0].owner, "alice");
        assert_eq!(polls[0].choices, vec!["cheese", "pepperoni"]);
    }

    #[test]
    fn test_start_poll_argument_errors() {
        let store = MemoryPollStore::new();

        let msg = msg_from("alice", "startpoll", &["pizza"]);
        let err = start_poll(&store, "!", &msg, msg.args()).unwrap_err();
        assert_eq!(reason(err), "missing required poll arguments");

        let msg = msg_from("alice", "startpoll", &["eat", "pizza"]);
        let err = start_poll(&store, "!", &msg, msg.args()).unwrap_err();
        assert!(reason(err).contains("example: !startpoll"));
        assert_eq!(store.get_active_channel_poll_count("#chan"), 0);
    }

    #[test]
    fn test_vote_without_polls_replies() {
        let store = MemoryPollStore::new();
        let msg = msg_from("alice", "vote", &["1"]);
        let reply = vote(&store, "!", &msg, msg.args()).unwrap();
        assert_eq!(reply.as_deref(), Some("there are NOT any active polls running right now to vote for"));
    }

    #[test]
    fn test_vote_requires_choice() {
        let store = MemoryPollStore::new();
        let msg = msg_from("alice", "vote", &[]);
        assert!(matches!(vote(&store, "!", &msg, msg.args()), Err(CommandError::InvalidArgs { .. })));
    }

    #[test]
    fn test_vote_twice_records_once() {
        let store = MemoryPollStore::new();
        let poll = start(&store, "eat pizza", 60.0);

        let first = msg_from("alice", "vote", &["1"]);
        assert_eq!(vote(&store, "!", &first, first.args()).unwrap(), None);

        let second = msg_from("alice", "vote", &["2"]);
        assert_eq!(vote(&store, "!", &second, second.args()).unwrap(), None);

        let stored = store.get_channel_poll_by_id("#chan", poll.id).unwrap();
        assert_eq!(stored.vote_count(), 1);
        assert_eq!(stored.votes().get("alice"), Some(&1));
    }

    #[test]
    fn test_vote_rejects_non_digit_choice() {
        let store = MemoryPollStore::new();
        start(&store, "eat pizza", 60.0);

        for bad in ["-1", "1.5"] {
            let msg = msg_from("alice", "vote", &[bad]);
            let err = vote(&store, "!", &msg, msg.args()).unwrap_err();
            assert_eq!(reason(err), format!("{} is not a valid number", bad));
        }
    }

    #[test]
    fn test_vote_out_of_range_lists_choices() {
        let store = MemoryPollStore::new();
        start(&store, "eat pizza", 60.0);

        let msg = msg_from("alice", "vote", &["3"]);
        let reply = vote(&store, "!", &msg, msg.args()).unwrap().unwrap();
        assert_eq!(reply, "3 is not a valid choice id for poll#1, choices are: 1: cheese, 2: pepperoni");
    }

    #[test]
    fn test_vote_with_multiple_polls() {
        let store = MemoryPollStore::new();
        start(&store, "first", 60.0);
        let second = start(&store, "second", 60.0);

        let msg = msg_from("alice", "vote", &["1"]);
        assert!(reason(vote(&store, "!", &msg, msg.args()).unwrap_err()).contains("multiple polls"));

        let msg = msg_from("alice", "vote", &["1", "x"]);
        assert_eq!(reason(vote(&store, "!", &msg, msg.args()).unwrap_err()), "x is not a valid number");

        let msg = msg_from("alice", "vote", &["1", "9"]);
        assert_eq!(reason(vote(&store, "!", &msg, msg.args()).unwrap_err()), "Could not find poll by ID 9");

        let msg = msg_from("alice", "vote", &["2", "2"]);
        assert_eq!(vote(&store, "!", &msg, msg.args()).unwrap(), None);
        let stored = store.get_channel_poll_by_id("#chan", second.id).unwrap();
        assert_eq!(stored.votes().get("alice"), Some(&2));
    }

    #[test]
    fn test_list_polls() {
        let store = MemoryPollStore::new();
        let msg = msg_from("alice", "listpolls", &[]);
        assert_eq!(list_polls(&store, &msg).unwrap().as_deref(), Some(""));

        start(&store, "first", 60.0);
        start(&store, "second", 60.0);
        assert_eq!(
            list_polls(&store, &msg).unwrap().as_deref(),
            Some("1 -> \"first\" | 2 -> \"second\"")
        );
    }

    #[test]
    fn test_poll_info() {
        let store = MemoryPollStore::new();
        let msg = msg_from("alice", "pollinfo", &[]);
        assert_eq!(
            poll_info(&store, "!", &msg, msg.args()).unwrap().as_deref(),
            Some("there are not any polls active right now")
        );

        start(&store, "eat pizza", 60.0);
        let reply = poll_info(&store, "!", &msg, msg.args()).unwrap().unwrap();
        assert!(reply.starts_with("POLL INFO #1 - title: \"eat pizza\" - choices: 1: cheese, 2: pepperoni - seconds left: "));

        start(&store, "second", 60.0);
        assert!(reason(poll_info(&store, "!", &msg, msg.args()).unwrap_err()).contains("poll id is required"));

        let msg = msg_from("alice", "pollinfo", &["-2"]);
        assert_eq!(reason(poll_info(&store, "!", &msg, msg.args()).unwrap_err()), "-2 is not valid number");

        let msg = msg_from("alice", "pollinfo", &["2"]);
        let reply = poll_info(&store, "!", &msg, msg.args()).unwrap().unwrap();
        assert!(reply.starts_with("POLL INFO #2 - title: \"second\""));
    }

    #[test]
    fn test_register_poll_commands() {
        let mut commands = CommandService::new("!");
        register_poll_commands(&mut commands, Arc::new(MemoryPollStore::new()));

        for name in ["startpoll", "vote", "listpolls", "pollinfo"] {
            let cmd = commands.find(name).unwrap();
            assert!(cmd.handler.is_some());
            assert_eq!(cmd.permissions, vec![name.to_string()]);
        }
    }
}
