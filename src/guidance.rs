//! Advisory text per status

use crate::types::Status;

const GREEN_GUIDANCE: &str = "**Scientific guidance**\n\
- The overall Bio-Time level stays near the pre-meal baseline.\n\
- Such meals are compatible with long-term metabolic resilience.\n\
- Maintain fibre and protein intake; avoid excessive liquid sugars.\n";

const YELLOW_GUIDANCE: &str = "**Scientific guidance**\n\
- The system accepts a moderate Bio-Time contraction to handle this meal.\n\
- Repeated YELLOW patterns may accumulate subtle 'time-debt' – fatigue or brain fog after meals.\n\
- Reducing fast sugars and adding fibre/protein can lower the Bio-Time cost.\n";

const RED_GUIDANCE: &str = "**Scientific guidance**\n\
- The meal induces a strong average contraction of biological time.\n\
- Recurrent RED patterns are compatible with higher metabolic and vascular stress.\n\
- Consider reducing high-GI and liquid carbohydrates and seeking professional advice if common.\n";

/// Fixed multi-line guidance block for a status
pub fn guidance_for(status: Status) -> &'static str {
    match status {
        Status::Green => GREEN_GUIDANCE,
        Status::Yellow => YELLOW_GUIDANCE,
        Status::Red => RED_GUIDANCE,
    }
}
