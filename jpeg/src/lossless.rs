//! Sample prediction of the lossless process (ITU-T T.81 H.1.2.1).

/// Predicts each sample of one component from its reconstructed neighbours.
///
/// The first sample of a scan or restart interval is predicted
/// from the default value `2^(P - Pt - 1)`,
/// the remaining samples of that first line from their left neighbour,
/// and the first sample of every other line from the sample above it.
#[derive(Debug, Clone)]
pub(crate) struct Predictor {
    selection: u8,
    initial: i32,
    interval_row: usize,
    fresh: bool,
}

impl Predictor {
    pub fn new(selection: u8, precision: u8, point_transform: u8) -> Self {
        Predictor {
            selection,
            initial: 1 << (precision - point_transform - 1),
            interval_row: 0,
            fresh: true,
        }
    }

    /// Start a new restart interval at the given line.
    pub fn restart(&mut self, row: usize) {
        self.interval_row = row;
        self.fresh = true;
    }

    /// The prediction for sample `(x, y)` of a plane of `width` samples.
    /// All samples before it in raster order must be reconstructed.
    pub fn predict(&mut self, plane: &[u16], width: usize, x: usize, y: usize) -> i32 {
        if self.fresh {
            self.fresh = false;
            return self.initial;
        }
        let at = |x: usize, y: usize| i32::from(plane[y * width + x]);
        if y == self.interval_row && x > 0 {
            return at(x - 1, y);
        }
        if x == 0 {
            return at(0, y - 1);
        }
        let (ra, rb, rc) = (at(x - 1, y), at(x, y - 1), at(x - 1, y - 1));
        match self.selection {
            1 => ra,
            2 => rb,
            3 => rc,
            4 => ra + rb - rc,
            5 => ra + ((rb - rc) >> 1),
            6 => rb + ((ra - rc) >> 1),
            _ => (ra + rb) / 2,
        }
    }
}

/// Reduce a difference modulo 2^16 to the range `-32767..=32768`.
#[inline]
pub(crate) fn wrap_difference(diff: i32) -> i32 {
    let d = diff & 0xFFFF;
    if d > 0x8000 {
        d - 0x10000
    } else {
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_and_column_rules() {
        // 3x2 plane
        let plane = [10u16, 20, 30, 40, 50, 60];
        let mut p = Predictor::new(4, 8, 0);
        assert_eq!(p.predict(&plane, 3, 0, 0), 128);
        assert_eq!(p.predict(&plane, 3, 1, 0), 10);
        assert_eq!(p.predict(&plane, 3, 2, 0), 20);
        assert_eq!(p.predict(&plane, 3, 0, 1), 10);
        // Ra + Rb - Rc = 40 + 20 - 10
        assert_eq!(p.predict(&plane, 3, 1, 1), 50);

        p.restart(1);
        assert_eq!(p.predict(&plane, 3, 0, 1), 128);
        assert_eq!(p.predict(&plane, 3, 1, 1), 40);
    }

    #[test]
    fn point_transform_lowers_default() {
        let mut p = Predictor::new(1, 12, 2);
        assert_eq!(p.predict(&[0], 1, 0, 0), 512);
    }

    #[test]
    fn differences_wrap() {
        assert_eq!(wrap_difference(5), 5);
        assert_eq!(wrap_difference(-5), -5);
        assert_eq!(wrap_difference(65535), -1);
        assert_eq!(wrap_difference(-32768), 32768);
        assert_eq!(wrap_difference(32768), 32768);
    }
}
