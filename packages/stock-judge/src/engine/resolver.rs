//! Priority resolver.

use tracing::debug;

use crate::error::BrowseResult;
use crate::traits::browser::Page;
use crate::types::signal::Signal;

/// What the page shows once the detector has returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// An out-of-stock signal is visible
    OutOfStock { signal: String },

    /// No out-of-stock signal is visible and the available signal is
    InStock { signal: String },

    /// Nothing recognizable rendered
    Inconclusive,
}

/// Check signals in priority order: every out-of-stock signal in declared
/// order, then the available signal.
///
/// Out-of-stock wins whenever it is visible, even if the available signal is
/// visible too; storefronts often leave a disabled cart button in the DOM.
pub async fn resolve<P: Page + ?Sized>(
    page: &P,
    out_of_stock: &[Signal],
    available: &Signal,
) -> BrowseResult<Resolution> {
    for signal in out_of_stock {
        if page.is_visible(&signal.matcher).await? {
            debug!(signal = %signal.name, "Out-of-stock signal visible");
            return Ok(Resolution::OutOfStock {
                signal: signal.name.clone(),
            });
        }
    }

    if page.is_visible(&available.matcher).await? {
        debug!(signal = %available.name, "Available signal visible");
        return Ok(Resolution::InStock {
            signal: available.name.clone(),
        });
    }

    Ok(Resolution::Inconclusive)
}
