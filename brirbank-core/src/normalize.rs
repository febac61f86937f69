use crate::bank::BrirBank;
use crate::events::BrirEvent;

/// Rescales the bank by one global factor if any sample exceeds full scale.
///
/// Returns the `ClippingCorrected` advisory when the bank was rescaled, so the
/// caller can report it. Relative loudness between ears and orientations is kept.
pub fn normalize(bank: &mut BrirBank) -> Option<BrirEvent> {
    let peak = bank.peak();
    if peak <= 1.0 {
        log::debug!("Bank peak {:.4} within full scale", peak);
        return None;
    }

    log::warn!(
        "BRIR bank clips (peak {:.4}), rescaling all orientations by 1/{:.4}",
        peak,
        peak
    );
    for sample in bank.as_mut_slice() {
        *sample /= peak;
    }

    Some(BrirEvent::ClippingCorrected { peak })
}
