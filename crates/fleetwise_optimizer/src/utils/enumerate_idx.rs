/// Like [`Iterator::enumerate`], but the position comes out as a typed id
/// (`RouteIdx`, `VehicleIdx`, ...) chosen by the caller.
pub trait EnumerateIdx: Iterator + Sized {
    fn enumerate_idx<Idx: From<usize>>(self) -> impl Iterator<Item = (Idx, Self::Item)> {
        self.enumerate()
            .map(|(position, item)| (Idx::from(position), item))
    }
}

impl<I: Iterator> EnumerateIdx for I {}
