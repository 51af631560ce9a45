//! Custom sample positions.

use a6xx_protocol::regs::{
    sample_location, GRAS_SAMPLE_CONFIG, RB_SAMPLE_CONFIG, SAMPLE_CONFIG_LOCATION_ENABLE, SP_TP_SAMPLE_CONFIG,
};
use a6xx_protocol::CsWriter;

use crate::types::SampleLocationsInfo;

/// Size of [`emit_sample_locations`] for the default or a custom pattern.
pub const fn sample_locations_dwords(custom: bool) -> u32 {
    if custom {
        9
    } else {
        6
    }
}

/// Programs the sample pattern into the three units that read it. `None` selects the
/// hardware's standard pattern.
///
/// Locations are packed one byte per sample, so only the first four are used.
pub fn emit_sample_locations(cs: &mut CsWriter, info: Option<&SampleLocationsInfo>) {
    let Some(info) = info else {
        for reg in [GRAS_SAMPLE_CONFIG, RB_SAMPLE_CONFIG, SP_TP_SAMPLE_CONFIG] {
            cs.emit_pkt4(reg, 1);
            cs.emit(0);
        }
        return;
    };

    let locations = info
        .locations
        .iter()
        .take(4)
        .enumerate()
        .fold(0u32, |acc, (i, loc)| acc | (sample_location(loc.x, loc.y) << (8 * i)));

    for reg in [GRAS_SAMPLE_CONFIG, RB_SAMPLE_CONFIG, SP_TP_SAMPLE_CONFIG] {
        cs.emit_pkt4(reg, 2);
        cs.emit(SAMPLE_CONFIG_LOCATION_ENABLE);
        cs.emit(locations);
    }
}
