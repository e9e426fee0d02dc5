//! Structural checks over a whole tree version.

use crate::error::{Error, Result};
use crate::node::{Node, NodeKind};

/// Check every structural invariant below `root` and that it holds exactly `size` values.
pub(crate) fn validate<V>(root: Option<&Node<V>>, size: usize) -> Result<()> {
    let counted = match root {
        Some(root) => check_tree(root)?,
        None => 0,
    };
    if counted != size {
        return Err(Error::SizeMismatch {
            recorded: size,
            counted,
        });
    }
    Ok(())
}

/// Depth-first walk sharing one path buffer. Each pending node remembers the length of its
/// parent's path and the byte that led to it. Returns the number of values found.
fn check_tree<V>(root: &Node<V>) -> Result<usize> {
    let mut path = Vec::new();
    let mut pending: Vec<(&Node<V>, usize, Option<u8>)> = vec![(root, 0, None)];
    let mut counted = 0;

    while let Some((node, parent_len, byte)) = pending.pop() {
        path.truncate(parent_len);
        path.extend(byte);

        if let Some(key) = node.key() {
            if !key.starts_with(&path) {
                return Err(Error::PrefixMismatch {
                    path,
                    key: key.to_vec(),
                });
            }
            counted += 1;
            continue;
        }

        path.extend_from_slice(node.prefix());
        check_inner(node, &path)?;
        if node.terminal().is_some() {
            counted += 1;
        }
        let len = path.len();
        pending.extend(node.children().map(|(b, child)| (child, len, Some(b))));
    }
    Ok(counted)
}

/// Checks local to one internal node whose full path, prefix included, is `path`.
fn check_inner<V>(node: &Node<V>, path: &[u8]) -> Result<()> {
    let num_children = node.num_children();
    if num_children == 0 {
        return Err(Error::EmptyInner { path: path.to_vec() });
    }
    if num_children == 1 && node.terminal().is_none() {
        return Err(Error::Uncollapsed { path: path.to_vec() });
    }
    let kind = node.kind();
    if kind != NodeKind::minimal_for(num_children) {
        return Err(Error::NonMinimalTier {
            path: path.to_vec(),
            kind,
            children: num_children,
        });
    }
    if let Some(terminal) = node.terminal()
        && terminal.key() != Some(path)
    {
        return Err(Error::MisplacedTerminal {
            path: path.to_vec(),
            key: terminal.key().unwrap_or_default().to_vec(),
        });
    }
    Ok(())
}
