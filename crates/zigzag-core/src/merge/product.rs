///
/// ProductCursor
///
/// Mixed-radix odometer over the per-stream run buffers: one digit per
/// stream, digit `i` counting up to the length of run buffer `i`. The last
/// digit moves fastest. Pausing is simply not calling `increment`; there is
/// no other state to save.
///

#[derive(Debug, Default)]
pub(super) struct ProductCursor {
    digits: Vec<usize>,
    active: bool,
}

impl ProductCursor {
    /// Start a new product over `width` run buffers with every digit at zero.
    pub(super) fn begin(&mut self, width: usize) {
        self.digits.clear();
        self.digits.resize(width, 0);
        self.active = true;
    }

    pub(super) const fn is_active(&self) -> bool {
        self.active
    }

    pub(super) fn digits(&self) -> &[usize] {
        &self.digits
    }

    /// Step to the next combination. Returns `false` once the leftmost digit
    /// overflows, which ends the product.
    pub(super) fn increment(&mut self, radix: impl Fn(usize) -> usize) -> bool {
        for position in (0..self.digits.len()).rev() {
            self.digits[position] += 1;
            if self.digits[position] < radix(position) {
                return true;
            }
            self.digits[position] = 0;
        }
        self.active = false;

        false
    }

    pub(super) const fn clear(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enumerate(radices: &[usize]) -> Vec<Vec<usize>> {
        let mut cursor = ProductCursor::default();
        cursor.begin(radices.len());

        let mut out = vec![cursor.digits().to_vec()];
        while cursor.increment(|position| radices[position]) {
            out.push(cursor.digits().to_vec());
        }

        out
    }

    #[test]
    fn odometer_moves_last_digit_fastest() {
        assert_eq!(
            enumerate(&[2, 3]),
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 1],
                vec![1, 2],
            ]
        );
    }

    #[test]
    fn combination_count_is_product_of_radices() {
        assert_eq!(enumerate(&[3, 1, 4]).len(), 12);
        assert_eq!(enumerate(&[1]).len(), 1);
        assert_eq!(enumerate(&[1, 1, 1]).len(), 1);
    }

    #[test]
    fn overflow_deactivates_and_begin_rearms() {
        let mut cursor = ProductCursor::default();
        assert!(!cursor.is_active());

        cursor.begin(1);
        assert!(cursor.is_active());
        assert!(!cursor.increment(|_| 1));
        assert!(!cursor.is_active());
        assert_eq!(cursor.digits(), &[0], "digits wrap back to zero on overflow");

        cursor.begin(2);
        assert!(cursor.is_active());
        assert_eq!(cursor.digits(), &[0, 0]);
    }
}
