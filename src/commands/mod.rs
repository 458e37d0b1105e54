mod account;
mod general;
mod results;
mod vote;

use dashmap::DashMap;
use itertools::Itertools;
use once_cell::sync::Lazy;

use crate::helpers::command_def::{CommandDef, CommandHandler};

pub const COMMANDS: &[CommandDef] = &[
    CommandDef {
        name: account::REGISTER,
        usage: "register <pseudo> <email> <password>",
        description: "Créer un compte et s'identifier",
        handler: account::register,
    },
    CommandDef {
        name: account::LOGIN,
        usage: "login <email> <password>",
        description: "Se connecter avec un compte existant",
        handler: account::login,
    },
    CommandDef {
        name: vote::VOTE,
        usage: "vote <oui|non>",
        description: "Répondre à la question",
        handler: vote::vote,
    },
    CommandDef {
        name: vote::NEW_VOTE,
        usage: "new",
        description: "Rouvrir le formulaire de vote",
        handler: vote::new_vote,
    },
    CommandDef {
        name: account::LOGOUT,
        usage: "logout",
        description: "Se déconnecter",
        handler: account::logout,
    },
    CommandDef {
        name: results::RESULTS,
        usage: "results",
        description: "Afficher les derniers résultats",
        handler: results::results,
    },
    CommandDef {
        name: results::WATCH,
        usage: "watch",
        description: "Suivre les résultats en direct (Entrée pour arrêter)",
        handler: results::watch,
    },
    CommandDef {
        name: general::STATUS,
        usage: "status",
        description: "Afficher l'écran courant",
        handler: general::status,
    },
    CommandDef {
        name: general::HELP,
        usage: "help",
        description: "Lister les commandes",
        handler: general::help,
    },
    CommandDef {
        name: general::QUIT,
        usage: "quit",
        description: "Quitter",
        handler: general::quit,
    },
];

static COMMAND_MAP: Lazy<DashMap<String, CommandHandler>> = Lazy::new(|| {
    let map = DashMap::new();

    for cmd in COMMANDS {
        map.insert(cmd.name.to_string(), cmd.handler);
    }

    map
});

pub fn get_handler(command_name: &str) -> Option<CommandHandler> {
    COMMAND_MAP
        .get(command_name)
        .as_ref()
        .map(|entry| *entry.value())
}

pub fn help_text() -> String {
    let width = COMMANDS.iter().map(|c| c.usage.len()).max().unwrap_or(0);

    COMMANDS
        .iter()
        .map(|c| format!("  {:<width$}  {}", c.usage, c.description, width = width))
        .join("\n")
}
