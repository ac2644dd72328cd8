/*
Doorman: a membership and media bot for a community Discord server.
Copyright (C) 2024 Doorman Contributors

This program is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/
use thiserror::Error;

/// Everything that can go wrong between a command and the outside world.
/// A membership lookup miss is not in here; that is a valid classification,
/// not a failure.
#[derive(Debug, Error)]
pub enum Fault {
    /// The named collection does not exist upstream.
    #[error("collection '{0}' was not found upstream")]
    CollectionNotFound(String),

    /// Transport failure or a non-success answer from an upstream service.
    #[error("upstream service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The bounded fetch loop ran out of attempts without an accepted item.
    #[error("no acceptable item in '{collection}' after {attempts} attempts")]
    NoAcceptableItemFound { collection: String, attempts: u32 },

    /// A ledger row whose end-date cell is missing or unparseable.
    #[error("malformed ledger row for '{subject}': {detail}")]
    MalformedRecord { subject: String, detail: String },
}

impl Fault {
    /// The short message shown to the invoking user. `contact` is whoever
    /// gets pinged when the bot cannot help.
    pub fn user_message(&self, contact: &str) -> String {
        let what = match self {
            Fault::CollectionNotFound(name) => {
                format!("I couldn't find a collection called `{name}`.")
            }
            Fault::UpstreamUnavailable(_) => {
                "The upstream service isn't answering right now.".to_string()
            }
            Fault::NoAcceptableItemFound { collection, .. } => {
                format!("`{collection}` kept handing me things I can't post.")
            }
            Fault::MalformedRecord { subject, .. } => {
                format!("The ledger entry for `{subject}` looks off.")
            }
        };
        format!("{what} If this keeps happening, poke {contact}.")
    }
}

/// Shorthand for mapping a transport error into the taxonomy.
pub(crate) fn upstream(err: reqwest::Error) -> Fault {
    Fault::UpstreamUnavailable(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_names_the_escalation_contact() {
        let fault = Fault::NoAcceptableItemFound {
            collection: "memes".to_string(),
            attempts: 10,
        };
        let msg = fault.user_message("@modmail");
        assert!(msg.contains("memes"));
        assert!(msg.contains("@modmail"));
    }

    #[test]
    fn display_carries_context() {
        let fault = Fault::MalformedRecord {
            subject: "alice".to_string(),
            detail: "bad end date".to_string(),
        };
        assert_eq!(
            fault.to_string(),
            "malformed ledger row for 'alice': bad end date"
        );
    }
}
