//! Graduation state machine: Bonding -> Graduated, one-way.

use crate::datasource::ChainStateReader;
use crate::domain::{GraduationStatus, Lamports, Mint};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Default graduation threshold: 30 SOL in lamports.
pub const DEFAULT_GRADUATION_THRESHOLD: Lamports = Lamports(30_000_000_000);

/// Decides which pricing source is authoritative for a mint.
///
/// The chain's own flag wins when readable; otherwise graduation is derived
/// from SOL reserves crossing the configured threshold. Once a mint has
/// been observed Graduated it never reports Bonding again, so a flaky read
/// cannot flip a token back onto the curve.
pub struct GraduationPolicy {
    chain: Arc<dyn ChainStateReader>,
    threshold: Lamports,
    graduated: Mutex<HashSet<Mint>>,
}

impl GraduationPolicy {
    pub fn new(chain: Arc<dyn ChainStateReader>, threshold: Lamports) -> Self {
        Self {
            chain,
            threshold,
            graduated: Mutex::new(HashSet::new()),
        }
    }

    pub fn threshold(&self) -> Lamports {
        self.threshold
    }

    /// Read the authoritative pricing-source flag for a mint.
    ///
    /// Consumers read this exactly once per pricing operation and branch on
    /// it before touching any curve or reserve data.
    pub async fn status(&self, mint: &Mint) -> GraduationStatus {
        if self.graduated.lock().contains(mint) {
            return GraduationStatus::Graduated;
        }

        match self.chain.get_graduation_flag(mint).await {
            Ok(true) => {
                self.mark_graduated(mint);
                return GraduationStatus::Graduated;
            }
            Ok(false) => {}
            Err(e) => {
                warn!("Graduation flag read failed for mint={}: {}", mint, e);
            }
        }

        // The flag can lag the triggering event; reserves crossing the
        // threshold graduate regardless.
        match self.chain.get_sol_reserves(mint).await {
            Ok(reserves) if reserves > self.threshold => {
                self.mark_graduated(mint);
                GraduationStatus::Graduated
            }
            Ok(_) => GraduationStatus::Bonding,
            Err(e) => {
                warn!("Reserve read failed for mint={}: {}", mint, e);
                GraduationStatus::Bonding
            }
        }
    }

    fn mark_graduated(&self, mint: &Mint) {
        let mut graduated = self.graduated.lock();
        if graduated.insert(mint.clone()) {
            info!("Mint {} graduated to pooled pricing", mint);
        }
    }
}

impl std::fmt::Debug for GraduationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraduationPolicy")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}
