//! Built-in polling table
//!
//! Used whenever neither `POLL_ITEMS` nor a config file supplies a list. The
//! first 24 entries match the column layout of the Viessdata CSV export.

use super::bitslice::{BitSlice, SliceValue};
use super::descriptor::Datapoint;

fn slice(start: usize, end: usize, value: SliceValue) -> BitSlice {
    BitSlice {
        start,
        end,
        mask: None,
        value,
    }
}

/// The default list of datapoints to poll
pub fn default_poll_items() -> Vec<Datapoint> {
    vec![
        Datapoint::datetime("Anlagenzeit", 0x088E, 8),
        Datapoint::scaled("AussenTemp", 0x0800, 2, 0.1, true),
        Datapoint::scaled("KesselTemp", 0x0802, 2, 0.1, false),
        Datapoint::scaled("WW/SpeicherTemp", 0x0804, 2, 0.1, false),
        Datapoint::scaled("AbgasTemp", 0x0808, 2, 0.1, false),
        Datapoint::scaled("AussenTemp_fltrd", 0x5525, 2, 0.1, true),
        Datapoint::scaled("AussenTemp_dmpd", 0x5523, 2, 0.1, true),
        Datapoint::scaled("AussenTemp_mixed", 0x5527, 2, 0.1, true),
        Datapoint::scaled("Eingang STB-Stoerung", 0x0A82, 1, 1.0, false),
        Datapoint::scaled("Brennerstoerung", 0x0884, 1, 1.0, false),
        Datapoint::scaled("Fehlerstatus Brennersteuergeraet", 0x5738, 1, 1.0, false),
        Datapoint::scaled("Brennerstarts", 0x088A, 4, 1.0, false),
        // seconds to hours
        Datapoint::scaled("Betriebsstunden", 0x08A7, 4, 2.7777778e-4, false),
        Datapoint::scaled("Stellung Umschaltventil", 0x0A10, 1, 1.0, false),
        Datapoint::scaled("RL/RuecklaufTemp_calcd", 0x0C20, 2, 0.01, false),
        Datapoint::scaled("Pumpenleistung", 0x0A3C, 1, 1.0, false),
        // scaled for the Viessdata chart, the controller reports whole units
        Datapoint::scaled("Volumenstrom", 0x0C24, 2, 0.1, false),
        Datapoint::scaled("KesselTemp_soll", 0x555A, 2, 0.1, false),
        Datapoint::scaled("BrennerLeistung", 0xA38F, 1, 0.5, false),
        Datapoint::scaled("BrennerModulation", 0x55D3, 1, 1.0, false),
        Datapoint::scaled("Status", 0xA152, 2, 1.0, false),
        Datapoint::scaled("SpeicherTemp_soll_akt", 0x6500, 2, 0.1, false),
        Datapoint::scaled("Speicherladepumpe", 0x6513, 1, 1.0, false),
        Datapoint::scaled("Zirkulationspumpe", 0x6515, 2, 1.0, false),
        Datapoint::bit_slice(
            "Frostgefahr, aktuelle RTS etc",
            0x2500,
            22,
            slice(0, 21, SliceValue::Raw),
        ),
        Datapoint::bit_slice("Frostgefahr", 0x2500, 22, slice(16, 16, SliceValue::Raw)),
        Datapoint::bit_slice(
            "RTS_akt",
            0x2500,
            22,
            slice(
                12,
                13,
                SliceValue::Scaled {
                    scale: 0.1,
                    signed: false,
                },
            ),
        ),
    ]
}
