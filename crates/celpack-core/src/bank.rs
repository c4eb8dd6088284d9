//! Palette bank arithmetic.
//!
//! A palette is split into banks of `bank_size` consecutive entries (16 by default).
//! Bank ids are 1-based: index `v` belongs to bank `v / bank_size + 1`. The first entry of
//! every bank (`v % bank_size == 0`) is reserved and never counts towards a bank.

use serde::{Deserialize, Serialize};

/// Bank membership of one cel's pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CelBanks {
    /// At least one pixel uses a non-reserved index.
    pub has_valid_pixels: bool,
    /// The single bank every valid pixel belongs to; `None` when pixels span several banks
    /// (or when there are no valid pixels).
    pub bank: Option<u16>,
}

impl CelBanks {
    /// Valid pixels exist and span two or more banks.
    pub fn is_mixed(&self) -> bool {
        self.has_valid_pixels && self.bank.is_none()
    }
}

pub fn is_reserved(value: u8, bank_size: u16) -> bool {
    value as u16 % bank_size == 0
}

/// Bank id of a palette index, or `None` for reserved indices.
pub fn bank_of(value: u8, bank_size: u16) -> Option<u16> {
    if is_reserved(value, bank_size) {
        None
    } else {
        Some(value as u16 / bank_size + 1)
    }
}

/// Compact overlay index for a bank: banks cycle through `1..bank_size`.
///
/// With 16-color banks this is `((bank - 1) mod 15) + 1`, so bank 2 maps to 2 and bank 16
/// wraps around to 1.
pub fn mask_index(bank: u16, bank_size: u16) -> u8 {
    let span = bank_size.saturating_sub(1).max(1);
    ((bank.saturating_sub(1) % span) + 1) as u8
}

/// Classifies a buffer of palette indices in a single pass.
///
/// The first valid pixel fixes the candidate bank; the scan stops at the first valid pixel
/// from a different bank.
pub fn classify_indices(pixels: &[u8], bank_size: u16) -> CelBanks {
    let mut candidate: Option<u16> = None;
    for &v in pixels {
        let Some(bank) = bank_of(v, bank_size) else {
            continue;
        };
        match candidate {
            None => candidate = Some(bank),
            Some(c) if c != bank => {
                return CelBanks {
                    has_valid_pixels: true,
                    bank: None,
                };
            }
            Some(_) => {}
        }
    }
    CelBanks {
        has_valid_pixels: candidate.is_some(),
        bank: candidate,
    }
}
