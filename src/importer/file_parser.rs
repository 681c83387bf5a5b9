// ==========================================
// 组合分析数据导入系统 - 文件解析器实现
// ==========================================
// 支持: CSV (.csv) / Excel (.xlsx/.xls)
// 解析失败是文件级可恢复错误（SkipReason），由调用方跳过该文件
// ==========================================

use crate::importer::error::SkipReason;
use crate::importer::importer_trait::FileParser;
use calamine::{open_workbook, Reader, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 解析后的原始表格
///
/// headers 保留源文件列顺序（推断 Schema 时列顺序以此为准）。
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<HashMap<String, String>>,
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_table(&self, file_path: &Path) -> Result<RawTable, SkipReason> {
        let file = File::open(file_path)
            .map_err(|e| SkipReason::ParseFailed(format!("{}: {}", file_path.display(), e)))?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        // 读取表头（TRIM）
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| SkipReason::ParseFailed(e.to_string()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        // 读取所有行
        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| SkipReason::ParseFailed(e.to_string()))?;
            let mut row_map = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行
            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            rows.push(row_map);
        }

        Ok(RawTable { headers, rows })
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_table(&self, file_path: &Path) -> Result<RawTable, SkipReason> {
        let mut workbook: Xlsx<_> = open_workbook(file_path)
            .map_err(|e: calamine::XlsxError| SkipReason::ParseFailed(e.to_string()))?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        if sheet_names.is_empty() {
            return Err(SkipReason::ParseFailed("Excel 文件无工作表".to_string()));
        }

        let sheet_name = sheet_names[0].clone();
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| SkipReason::ParseFailed(e.to_string()))?;

        // 提取表头（第一行）
        let mut range_rows = range.rows();
        let header_row = range_rows
            .next()
            .ok_or_else(|| SkipReason::ParseFailed("Excel 文件无数据行".to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        // 读取数据行
        let mut rows = Vec::new();
        for data_row in range_rows {
            let mut row_map = HashMap::new();

            for (col_idx, cell) in data_row.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    row_map.insert(header.clone(), cell.to_string().trim().to_string());
                }
            }

            // 跳过完全空白的行
            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            rows.push(row_map);
        }

        Ok(RawTable { headers, rows })
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> Result<RawTable, SkipReason> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_to_raw_table(path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_table(path),
            // 压缩导出（.csvz 等）无解压支持，作为文件级跳过处理
            _ => Err(SkipReason::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_csv(content: &str) -> NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let f = temp_csv("日期,组合净值,基准净值\n2025-01-20,1.05,1.01\n2025-01-21,1.06,1.02\n");

        let table = CsvParser.parse_to_raw_table(f.path()).unwrap();
        assert_eq!(table.headers, vec!["日期", "组合净值", "基准净值"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get("组合净值"), Some(&"1.05".to_string()));
    }

    #[test]
    fn test_csv_parser_trims_headers() {
        let f = temp_csv(" code , weight \nA,0.5\n");
        let table = CsvParser.parse_to_raw_table(f.path()).unwrap();
        assert_eq!(table.headers, vec!["code", "weight"]);
        assert_eq!(table.rows[0].get("code"), Some(&"A".to_string()));
    }

    #[test]
    fn test_csv_parser_skip_blank_rows() {
        let f = temp_csv("code,weight\nA,0.5\n,\nB,0.3\n");
        let table = CsvParser.parse_to_raw_table(f.path()).unwrap();
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_to_raw_table(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(SkipReason::ParseFailed(_))));
    }

    #[test]
    fn test_universal_parser_unsupported_extension() {
        let result = UniversalFileParser.parse(Path::new("x_contribution.csvz"));
        assert_eq!(
            result.unwrap_err(),
            SkipReason::UnsupportedFormat("csvz".to_string())
        );
    }
}
