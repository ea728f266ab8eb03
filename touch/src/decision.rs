use crate::Delta;

/// A touch is a drop below baseline strictly larger than `threshold`
pub fn decide(delta: Delta, threshold: u16) -> bool {
    delta > threshold as Delta
}
