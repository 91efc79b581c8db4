//! 文字列比較ユーティリティ

/// 大文字小文字を無視した比較用に変換
///
/// トルコ語の `İ`（点付き大文字）と `ı`（点なし小文字）は `i` に寄せる。
/// `"SİCİL NO"` と `"Sicil"` を同一視するため。
pub fn fold_case(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| *c != '\u{0307}')
        .map(|c| if c == 'ı' { 'i' } else { c })
        .collect()
}

/// 大文字小文字を無視した部分一致
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    fold_case(haystack).contains(&fold_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_case_turkish() {
        assert_eq!(fold_case("SİCİL NO"), "sicil no");
        assert_eq!(fold_case("Sicil"), "sicil");
        assert_eq!(fold_case("ÜCRET"), "ücret");
        assert_eq!(fold_case("ADI SOYADI"), "adi soyadi");
        assert_eq!(fold_case("Çıkış"), "çikiş");
    }

    #[test]
    fn test_contains_folded() {
        assert!(contains_folded("SİCİL NO", "Sicil"));
        assert!(contains_folded("AD SOYAD", "Ad Soyad"));
        assert!(!contains_folded("ÜCRET", "Sicil"));
        assert!(contains_folded("anything", ""));
    }
}
