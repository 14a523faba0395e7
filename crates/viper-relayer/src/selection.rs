//! Choosing the session node that services a relay.

use crate::error::ValidationError;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use viper_core::{Node, Session};

/// Whether a node with the same public key belongs to `session`.
pub fn is_node_in_session(session: &Session, node: &Node) -> bool {
    session
        .nodes
        .iter()
        .any(|session_node| session_node.public_key == node.public_key)
}

/// Pick a session node uniformly at random from the OS RNG.
///
/// Returns `None` only for a session without nodes.
pub fn random_session_node(session: &Session) -> Option<&Node> {
    session.nodes.choose(&mut OsRng)
}

/// Resolve the servicer: the requested node if it is in the session,
/// otherwise a random session node.
pub fn select_node<'a>(
    session: &'a Session,
    requested: Option<&'a Node>,
) -> Result<&'a Node, ValidationError> {
    match requested {
        Some(node) if is_node_in_session(session, node) => Ok(node),
        Some(_) => Err(ValidationError::NodeNotInSession),
        None => random_session_node(session).ok_or(ValidationError::SessionHasNoNodes),
    }
}
