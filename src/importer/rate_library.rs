// ==========================================
// 家具订单报价系统 - 费率库 CSV 导入
// ==========================================
// 格式: material_type,name,rate,uom（首行为表头，列顺序不限）
// 规则:
// - 材料类别 / 材料名 / 单位为空的行拒绝，并记录行号
// - 费率为空按 0；非数字拒绝
// - 同一类别的行归并为一个费率库条目，同名材料后出现者覆盖
// ==========================================

use crate::domain::rate::RateMaterial;
use crate::domain::types::parse_number;
use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const REQUIRED_COLUMNS: [&str; 4] = ["material_type", "name", "rate", "uom"];

/// 导入结果
#[derive(Debug, Default)]
pub struct RateLibraryImport {
    /// 按类别归并后的条目
    pub materials: Vec<RateMaterial>,
    /// 接受的数据行数
    pub accepted_rows: usize,
    /// 被拒绝的行（带行号）
    pub rejected: Vec<ImportError>,
}

impl RateLibraryImport {
    pub fn option_count(&self) -> usize {
        self.materials.iter().map(|m| m.options.len()).sum()
    }
}

// ==========================================
// RateLibraryImporter - 费率库导入器
// ==========================================
pub struct RateLibraryImporter;

impl RateLibraryImporter {
    /// 解析 CSV 文件
    ///
    /// # 返回
    /// - Ok(RateLibraryImport): 解析结果（可能包含被拒绝的行）
    /// - Err: 文件不存在 / 非 CSV / 缺少必需列
    pub fn parse_file(path: &Path) -> ImportResult<RateLibraryImport> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        if let Some(ext) = path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let file = File::open(path)?;
        Self::parse_reader(file)
    }

    /// 从任意输入流解析
    pub fn parse_reader<R: Read>(input: R) -> ImportResult<RateLibraryImport> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(input);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let mut columns = [0usize; 4];
        for (slot, name) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ImportError::MissingColumn(name.to_string()))?;
        }
        let [type_col, name_col, rate_col, uom_col] = columns;

        let mut grouped: BTreeMap<String, RateMaterial> = BTreeMap::new();
        let mut result = RateLibraryImport::default();

        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            // 表头占第 1 行
            let row = idx + 2;
            let field = |col: usize| record.get(col).unwrap_or("").trim();

            if record.iter().all(|v| v.trim().is_empty()) {
                continue;
            }

            let material_type = field(type_col);
            let name = field(name_col);
            let raw_rate = field(rate_col);
            let uom = field(uom_col);

            let missing = [("material_type", material_type), ("name", name), ("uom", uom)]
                .into_iter()
                .find(|(_, v)| v.is_empty());
            if let Some((column, _)) = missing {
                tracing::warn!(row, field = column, "费率行必填字段为空，已拒绝");
                result.rejected.push(ImportError::RequiredFieldMissing {
                    row,
                    field: column.to_string(),
                });
                continue;
            }

            let rate = if raw_rate.is_empty() {
                0.0
            } else {
                match parse_number(raw_rate) {
                    Some(rate) => rate,
                    None => {
                        tracing::warn!(row, raw_rate, "费率不是数字，已拒绝");
                        result.rejected.push(ImportError::TypeConversionError {
                            row,
                            field: "rate".to_string(),
                            message: format!("无法解析为数字: {}", raw_rate),
                        });
                        continue;
                    }
                }
            };

            let entry = grouped
                .entry(material_type.to_string())
                .or_insert_with(|| RateMaterial::new(material_type));
            entry.merge(RateMaterial::new(material_type).with_option(name, rate, uom));
            result.accepted_rows += 1;
        }

        result.materials = grouped.into_values().collect();
        tracing::info!(
            accepted = result.accepted_rows,
            rejected = result.rejected.len(),
            material_types = result.materials.len(),
            "费率库 CSV 解析完成"
        );
        Ok(result)
    }
}
