use crate::domain::entities::{Command, CommandRegistry, CommandResult, Content, Message};
use crate::application::errors::CommandError;
use crate::mods::{Event, ModRegistry};

/// Service for managing and executing commands
pub struct CommandService {
    registry: CommandRegistry,
    prefix: String,
}

impl CommandService {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            registry: CommandRegistry::new(),
            prefix: prefix.into(),
        }
    }

    pub fn register(&mut self, command: Command) {
        self.registry.register(command);
    }

    pub fn register_defaults(&mut self) {
        // Help is answered by the service itself
        self.register(Command::new("help")
            .with_description("Show help message")
            .with_usage("(command)"));

        self.register(Command::new("version")
            .with_description("Show bot version")
            .with_handler(|_, _| {
                Ok(Some(format!("modbot v{}", env!("CARGO_PKG_VERSION"))))
            }));
    }

    /// Find a command by name or alias
    pub fn find(&self, name: &str) -> Option<&Command> {
        self.registry.find(name)
    }

    /// Run a command message. Mods are asked first through
    /// `on_before_command_execute`; a veto skips the handler and yields
    /// `Ok(None)`. `on_after_command_execute` fires only when the handler
    /// succeeded.
    pub async fn execute(&self, message: &Message, mods: &ModRegistry) -> CommandResult {
        let Content::Command { name, args } = &message.content else {
            return Ok(None);
        };

        let cmd = self.registry.find(name)
            .ok_or_else(|| CommandError::NotFound(name.clone()))?;

        let before = mods.dispatch_event(Event::BeforeCommandExecute { msg: message, cmd }).await;
        if let Some(by) = before.vetoed_by {
            tracing::debug!("Command {} suppressed by mod '{}'", cmd.name, by);
            return Ok(None);
        }

        let result = if cmd.name == "help" {
            Ok(Some(self.get_help(args.first().map(String::as_str))))
        } else if let Some(handler) = &cmd.handler {
            handler(message, args)
        } else {
            Ok(Some(format!("Command {} not implemented", cmd.name)))
        };

        if result.is_ok() {
            mods.dispatch_event(Event::AfterCommandExecute { msg: message, cmd }).await;
        }

        result
    }

    pub fn get_help(&self, command: Option<&str>) -> String {
        if let Some(name) = command {
            let name = name.trim_start_matches(self.prefix.as_str());
            if let Some(cmd) = self.registry.find(name) {
                let mut help = format!("{}{} - {}", self.prefix, cmd.name, cmd.description.as_deref().unwrap_or("No description"));
                if let Some(usage) = &cmd.usage {
                    help.push_str(&format!(" - syntax: {}{} {}", self.prefix, cmd.name, usage));
                }
                return help;
            }
            return format!("Command {}{} not found", self.prefix, name);
        }

        // List all commands
        let names: Vec<String> = self.registry.all()
            .iter()
            .map(|cmd| format!("{}{}", self.prefix, cmd.name))
            .collect();
        format!("Available commands: {}", names.join(", "))
    }

    /// `!name usage` for a command, used in error replies
    pub fn syntax(&self, name: &str) -> Option<String> {
        let cmd = self.registry.find(name)?;
        let usage = cmd.usage.as_deref()?;
        Some(format!("{}{} {}", self.prefix, cmd.name, usage))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::User;
    use crate::mods::{HookResult, Mod};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Gate {
        allow: bool,
        after: AtomicUsize,
    }

    #[async_trait]
    impl Mod for Gate {
        fn name(&self) -> &str {
            "gate"
        }

        async fn on_before_command_execute(&self, _msg: &Message, _cmd: &Command) -> HookResult<bool> {
            Ok(self.allow)
        }

        async fn on_after_command_execute(&self, _msg: &Message, _cmd: &Command) -> HookResult {
            self.after.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn service() -> CommandService {
        let mut commands = CommandService::new("!");
        commands.register_defaults();
        commands.register(Command::new("ping")
            .with_usage("(anything)")
            .with_handler(|_, _| Ok(Some("pong".to_string()))));
        commands.register(Command::new("broken")
            .with_handler(|_, _| Err(CommandError::invalid_args("broken", "nope"))));
        commands
    }

    fn command(name: &str) -> Message {
        Message::from_command("#chan", User::new("alice"), name, vec![])
    }

    #[tokio::test]
    async fn test_execute_runs_handler_and_after_hook() {
        let mods = ModRegistry::new();
        let gate = Arc::new(Gate { allow: true, after: AtomicUsize::new(0) });
        mods.register(gate.clone());

        let reply = service().execute(&command("ping"), &mods).await.unwrap();
        assert_eq!(reply.as_deref(), Some("pong"));
        assert_eq!(gate.after.load(Ordering::SeqCst), 1);

        assert!(service().execute(&command("broken"), &mods).await.is_err());
        assert_eq!(gate.after.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_before_hook_veto_suppresses_command() {
        let mods = ModRegistry::new();
        let gate = Arc::new(Gate { allow: false, after: AtomicUsize::new(0) });
        mods.register(gate.clone());

        let reply = service().execute(&command("ping"), &mods).await.unwrap();
        assert_eq!(reply, None);
        assert_eq!(gate.after.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let mods = ModRegistry::new();
        let err = service().execute(&command("nope"), &mods).await.unwrap_err();
        assert!(matches!(err, CommandError::NotFound(name) if name == "nope"));
    }

    #[tokio::test]
    async fn test_help() {
        let mods = ModRegistry::new();
        let reply = service().execute(&command("help"), &mods).await.unwrap().unwrap();
        assert_eq!(reply, "Available commands: !broken, !help, !ping, !version");

        let commands = service();
        assert_eq!(commands.get_help(Some("!ping")), "!ping - No description - syntax: !ping (anything)");
        assert_eq!(commands.syntax("ping").as_deref(), Some("!ping (anything)"));
        assert_eq!(commands.syntax("version"), None);
    }
}
