//! Selector resolution against the live page.

use tracing::{debug, warn};
use walko_protocols::{DomHost, ElementHandle, ElementRect, HostError};

/// Outcome of resolving a stored selector.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Empty, blank, or markup-like; render centered without looking.
    NotPositional,
    /// Malformed CSS. Treated as not found, but retrying cannot help.
    Invalid,
    /// Valid selector with no live match (yet).
    NotFound,
    Found {
        element: ElementHandle,
        rect: ElementRect,
    },
}

impl Resolution {
    /// Only a plain miss earns the single bounded retry.
    pub fn should_retry(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn found(self) -> Option<(ElementHandle, ElementRect)> {
        match self {
            Self::Found { element, rect } => Some((element, rect)),
            _ => None,
        }
    }
}

/// Whether a selector can name an element at all.
pub fn is_positional(selector: &str) -> bool {
    let trimmed = selector.trim();
    !trimmed.is_empty() && !trimmed.starts_with('<')
}

/// Resolve `selector` to an element and its current bounding box.
///
/// An invalid selector is logged and never propagated. Other host failures
/// are returned so the caller can decide how to degrade.
pub async fn resolve(host: &dyn DomHost, selector: &str) -> Result<Resolution, HostError> {
    if !is_positional(selector) {
        debug!("selector {:?} is not positional", selector);
        return Ok(Resolution::NotPositional);
    }

    let element = match host.query_selector(selector.trim()).await {
        Ok(Some(element)) => element,
        Ok(None) => return Ok(Resolution::NotFound),
        Err(HostError::InvalidSelector(reason)) => {
            warn!("Invalid selector {:?}: {}", selector, reason);
            return Ok(Resolution::Invalid);
        }
        Err(e) => return Err(e),
    };

    match host.bounding_rect(&element).await {
        Ok(Some(rect)) => Ok(Resolution::Found { element, rect }),
        Ok(None) | Err(HostError::ElementDetached(_)) => {
            debug!("selector {:?} matched a detached element", selector);
            Ok(Resolution::NotFound)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_positional() {
        assert!(!is_positional(""));
        assert!(!is_positional("   \t"));
        assert!(!is_positional("<div class=\"x\">"));
        assert!(!is_positional("  <span>"));
        assert!(is_positional("#save"));
        assert!(is_positional("div > .item:nth-child(2)"));
    }

    #[test]
    fn test_only_not_found_retries() {
        assert!(Resolution::NotFound.should_retry());
        assert!(!Resolution::NotPositional.should_retry());
        assert!(!Resolution::Invalid.should_retry());
        let found = Resolution::Found {
            element: ElementHandle("e1".into()),
            rect: ElementRect::default(),
        };
        assert!(!found.should_retry());
        assert!(found.found().is_some());
    }
}
