#![allow(non_snake_case)]

use std::cmp::*;

/* clipping within min and max */
pub(crate) fn CLIP3<T: Ord>(min_x: T, max_x: T, value: T) -> T {
    max(min_x, min(max_x, value))
}

/* log2 of a power of two */
pub(crate) fn CONV_LOG2(v: u32) -> u32 {
    debug_assert!(v.is_power_of_two());
    v.trailing_zeros()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clip3() {
        assert_eq!(CLIP3(0, 2, 5), 2);
        assert_eq!(CLIP3(0, 2, -5), 0);
        assert_eq!(CLIP3(-128, 127, 40), 40);
    }

    #[test]
    fn conv_log2() {
        for i in 0..8 {
            assert_eq!(CONV_LOG2(1 << i), i);
        }
    }
}
