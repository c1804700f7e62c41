// ==========================================
// 温室气体排放计算 - 数据清洗器
// ==========================================
// 职责: TRIM / NULL 标准化 / 数值解析
// ==========================================

use tracing::debug;

pub struct DataCleaner;

impl DataCleaner {
    /// 空白 / "nan" / "null" 视为缺失
    pub fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            match trimmed.to_lowercase().as_str() {
                "" | "nan" | "null" | "none" | "n/a" => None,
                _ => Some(trimmed.to_string()),
            }
        })
    }

    /// 解析数值,无法解析或非有限值返回 None
    ///
    /// 兼容小数逗号（"0,122"）与千分位空格
    pub fn parse_decimal(&self, value: Option<&str>) -> Option<f64> {
        let text = self.normalize_null(value)?;
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let candidate = if compact.contains(',') && !compact.contains('.') {
            compact.replace(',', ".")
        } else {
            compact.replace(',', "")
        };

        match candidate.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            _ => {
                debug!(raw = %text, "数值无法解析,按缺失处理");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_null() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_null(Some("  copper ")), Some("copper".to_string()));
        assert_eq!(cleaner.normalize_null(Some("   ")), None);
        assert_eq!(cleaner.normalize_null(Some("NaN")), None);
        assert_eq!(cleaner.normalize_null(None), None);
    }

    #[test]
    fn test_parse_decimal() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_decimal(Some("0.122")), Some(0.122));
        assert_eq!(cleaner.parse_decimal(Some(" 0,122 ")), Some(0.122));
        assert_eq!(cleaner.parse_decimal(Some("1,234.5")), Some(1234.5));
        assert_eq!(cleaner.parse_decimal(Some("abc")), None);
        assert_eq!(cleaner.parse_decimal(Some("inf")), None);
        assert_eq!(cleaner.parse_decimal(Some("")), None);
    }
}
