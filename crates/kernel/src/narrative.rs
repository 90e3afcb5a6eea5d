use crate::perception::Senses;

/// Formats finished sense values as text.
///
/// Implementations must be pure: the same senses give the same line, and
/// nothing is written back into simulation state. Swap the narrator to
/// localize or restyle output without touching perception.
pub trait Narrator {
    fn narrate(&self, senses: &Senses) -> String;
}

/// Plain English, one clause per channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNarrator;

impl Narrator for DefaultNarrator {
    fn narrate(&self, senses: &Senses) -> String {
        let sight = match senses.visual_clarity {
            v if v <= 0.0 => "Nothing lies ahead",
            v if v < 0.3 => "Faint shapes glimmer ahead",
            v if v < 0.7 => "Forms stand clear ahead",
            _ => "Radiance floods the view",
        };
        let sound = match senses.auditory_resonance {
            a if a <= 0.0 => "silence",
            a if a < 1.0 => "a distant hum",
            a if a < 3.0 => "a resonant chord",
            _ => "a roaring chorus",
        };
        let touch = match senses.haptic_pressure {
            h if h <= 0.0 => "no weight",
            h if h < 1.0 => "a gentle pull",
            h if h < 10.0 => "a steady pressure",
            _ => "a crushing weight",
        };
        let balance = match senses.vestibular_balance {
            b if b.abs() < 0.05 => "steady",
            b if b > 0.0 => "tilting sunwise",
            _ => "tilting widdershins",
        };
        format!(
            "{sight}; {sound} answers; {touch} is felt; balance is {balance} \
             (scent {:.2}, taste {:.2}).",
            senses.olfactory_essence, senses.gustatory_chemistry
        )
    }
}
