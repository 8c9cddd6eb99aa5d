use crate::moves::{Geometry, Move};
use crate::types::Coord;

use arrayvec::ArrayVec;

/// Returns the squares strictly between the source and the destination of `mv`
///
/// The squares are listed starting from the one next to the source. Irregular moves have
/// nothing in between, so the result is empty for them.
pub fn between(mv: Move) -> ArrayVec<Coord, 6> {
    let mut res = ArrayVec::new();
    if mv.geometry() == Geometry::Irregular {
        return res;
    }
    let (df, dr) = (mv.delta_file().signum(), mv.delta_rank().signum());
    let mut cur = mv.src();
    for _ in 1..mv.distance() {
        cur = match cur.try_shift(df, dr) {
            Some(c) => c,
            None => break,
        };
        res.push(cur);
    }
    res
}
