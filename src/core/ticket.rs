//! Two-dimensional resource cost tickets.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Describes the cost of a request passing through the fair queue.
///
/// A ticket is specified by a `weight` and a `size`. For example, a request of
/// weight 1 and size 16384 represents 1 operation moving 16kB. If the queue
/// admits one such request per second it sustains 1 op/s at 16kB/s bandwidth.
///
/// Arithmetic is component-wise. Note that tickets are only *partially*
/// ordered: `(2, 5)` and `(5, 2)` are mutually incomparable under
/// [`strictly_less`](Self::strictly_less).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceTicket {
    weight: u32,
    size: u32,
}

impl ResourceTicket {
    /// Construct a ticket with the given `weight` and `size`.
    #[must_use]
    pub const fn new(weight: u32, size: u32) -> Self {
        Self { weight, size }
    }

    /// The weight component (operation count) of this ticket.
    #[must_use]
    pub const fn weight(&self) -> u32 {
        self.weight
    }

    /// The size component (bytes) of this ticket.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// True if this ticket represents a non-zero quantity, i.e. at least one
    /// of its components is non-zero.
    #[must_use]
    pub const fn is_non_zero(&self) -> bool {
        self.weight > 0 || self.size > 0
    }

    /// True if this ticket is strictly less than `rhs`.
    ///
    /// Both quantities must be strictly smaller. There is no total ordering
    /// between two tickets.
    #[must_use]
    pub const fn strictly_less(&self, rhs: Self) -> bool {
        self.weight < rhs.weight && self.size < rhs.size
    }

    /// True if this ticket fits within `capacity` on both dimensions.
    ///
    /// This is the admission test used when deciding whether in-flight work
    /// plus a candidate ticket would stay inside the configured capacity.
    #[must_use]
    pub const fn fits_within(&self, capacity: Self) -> bool {
        self.weight <= capacity.weight && self.size <= capacity.size
    }

    /// The normalized scalar value of this ticket along a base `axis`.
    ///
    /// The value is the sum of the per-dimension ratios, so either weight or
    /// size carries more relative importance depending on which denominator
    /// is relatively higher. It is monotonically increasing in both of this
    /// ticket's components and invariant under uniform scaling of ticket and
    /// axis together.
    ///
    /// It is legal for this ticket to have one quantity set to zero, in which
    /// case only the other quantity contributes.
    ///
    /// # Panics
    ///
    /// Panics if either component of `axis` is zero. That is a caller bug:
    /// the axis is the queue's maximum capacity and a zero-capacity dimension
    /// admits nothing.
    #[must_use]
    pub fn normalize(&self, axis: Self) -> f64 {
        assert!(
            axis.weight > 0 && axis.size > 0,
            "normalize axis must be non-zero on both dimensions, got {axis}"
        );
        f64::from(self.weight) / f64::from(axis.weight)
            + f64::from(self.size) / f64::from(axis.size)
    }
}

impl Add for ResourceTicket {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            weight: self.weight + rhs.weight,
            size: self.size + rhs.size,
        }
    }
}

impl Sub for ResourceTicket {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            weight: self.weight - rhs.weight,
            size: self.size - rhs.size,
        }
    }
}

impl AddAssign for ResourceTicket {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for ResourceTicket {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl fmt::Display for ResourceTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.weight, self.size)
    }
}
