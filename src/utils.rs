use crate::constants_and_types as csts;

/// Calculate padding to the next 4-byte boundary
pub(crate) fn padding(count: usize) -> usize {
    match count % csts::ALIGNMENT {
        0 => 0,
        r => csts::ALIGNMENT - r,
    }
}

/// `count` rounded up to the next 4-byte boundary
pub(crate) fn padded(count: u64) -> u64 {
    count + padding((count % csts::ALIGNMENT as u64) as usize) as u64
}

/// [`padded`], `None` on overflow
pub(crate) fn checked_padded(count: u64) -> Option<u64> {
    count.checked_add(padding((count % csts::ALIGNMENT as u64) as usize) as u64)
}

/// Number of elements skipped when stepping once along each dimension.
///
/// The record dimension is not part of `shape`: stepping along it is done
/// with the record size.
pub(crate) fn product_vector(shape: &[u64]) -> Vec<u64> {
    // https://cluster.earlham.edu/bccd-ng/testing/mobeen/GALAXSEEHPC/netcdf-4.1.3/man4/netcdf.html#Computing-Offsets
    let mut prod = 1u64;
    let mut result: Vec<u64> = vec![0; shape.len()];
    for (i, v) in shape.iter().enumerate().rev() {
        result[i] = prod;
        prod *= v;
    }
    result
}

/// Checks a dimension, variable or attribute name against the NetCDF naming
/// rules: non empty, at most 256 bytes, starting with a letter, a digit, an
/// underscore or a multi-byte UTF-8 character, without control characters,
/// `/`, or trailing spaces.
pub fn is_valid_name(name: &str) -> bool {
    if name.is_empty() || name.len() > csts::NC_MAX_NAME {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii() && !(c.is_ascii_alphanumeric() || c == '_') => return false,
        _ => {}
    }
    if name.chars().any(|c| c.is_control() || c == '/') {
        return false;
    }
    !name.ends_with(' ')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding() {
        assert_eq!(padding(0), 0);
        assert_eq!(padding(1), 3);
        assert_eq!(padding(2), 2);
        assert_eq!(padding(3), 1);
        assert_eq!(padding(4), 0);
        assert_eq!(padded(9), 12);
        assert_eq!(padded(12), 12);
        assert_eq!(padded(0), 0);
    }

    #[test]
    fn test_product_vector() {
        let shape: Vec<u64> = vec![5, 3, 2, 7];
        let expected: Vec<u64> = vec![42, 14, 7, 1];
        assert_eq!(product_vector(&shape), expected);
    }

    #[test]
    fn test_scalar_product_vector() {
        assert!(product_vector(&[]).is_empty());
        assert_eq!(product_vector(&[4]), vec![1]);
    }

    #[test]
    fn test_names() {
        assert!(is_valid_name("title"));
        assert!(is_valid_name("_FillValue"));
        assert!(is_valid_name("café"));
        assert!(is_valid_name("2m_temperature"));
        assert!(is_valid_name("a b"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("!invalid"));
        assert!(!is_valid_name("a/b"));
        assert!(!is_valid_name("trailing "));
        assert!(!is_valid_name(&"x".repeat(257)));
    }
}
