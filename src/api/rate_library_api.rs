// ==========================================
// 家具订单报价系统 - 费率库 API
// ==========================================
// 职责: 费率库维护（录入、CSV 导入、查询），为新报价单生成费率表
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::quotation::{MaterialGroup, RateRow};
use crate::domain::rate::{RateMaterial, RateOption};
use crate::importer::RateLibraryImporter;
use crate::repository::RateMaterialRepository;

/// CSV 导入报告
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateImportReport {
    pub material_types: usize,
    pub options: usize,
    pub accepted_rows: usize,
    /// 被拒绝行的原因（含行号）
    pub rejected: Vec<String>,
}

// ==========================================
// RateLibraryApi - 费率库 API
// ==========================================
pub struct RateLibraryApi {
    repo: Arc<RateMaterialRepository>,
}

impl RateLibraryApi {
    pub fn new(repo: Arc<RateMaterialRepository>) -> Self {
        Self { repo }
    }

    /// 录入材料类别及其选项（同名选项覆盖）
    ///
    /// # 校验
    /// - 类别名、材料名、单位不能为空
    /// - 费率必须是有限数值
    pub fn add_rate_material(
        &self,
        material_type: &str,
        options: BTreeMap<String, RateOption>,
    ) -> ApiResult<RateMaterial> {
        let material_type = material_type.trim();
        if material_type.is_empty() {
            return Err(ApiError::InvalidInput("材料类别不能为空".to_string()));
        }
        if options.is_empty() {
            return Err(ApiError::InvalidInput(format!("{} 至少需要一个材料选项", material_type)));
        }

        let mut material = RateMaterial::new(material_type);
        for (name, option) in options {
            let name = name.trim();
            if name.is_empty() {
                return Err(ApiError::InvalidInput("材料名不能为空".to_string()));
            }
            if option.uom.trim().is_empty() {
                return Err(ApiError::InvalidInput(format!("材料 {} 的单位不能为空", name)));
            }
            if !option.rate.is_finite() {
                return Err(ApiError::InvalidInput(format!("材料 {} 的费率无效", name)));
            }
            material = material.with_option(name, option.rate, option.uom.trim());
        }

        let saved = self.repo.upsert(material)?;
        debug!(material_type, options = saved.options.len(), "费率库条目已录入");
        Ok(saved)
    }

    pub fn list_rate_materials(&self) -> ApiResult<Vec<RateMaterial>> {
        Ok(self.repo.list_all()?)
    }

    /// 从 CSV 导入费率库（合法行写入，非法行在报告中列出）
    pub fn import_csv(&self, path: &Path) -> ApiResult<RateImportReport> {
        let import = RateLibraryImporter::parse_file(path)?;

        let report = RateImportReport {
            material_types: import.materials.len(),
            options: import.option_count(),
            accepted_rows: import.accepted_rows,
            rejected: import.rejected.iter().map(|e| e.to_string()).collect(),
        };

        for material in import.materials {
            self.repo.upsert(material)?;
        }

        info!(
            path = %path.display(),
            material_types = report.material_types,
            rejected = report.rejected.len(),
            "费率库导入完成"
        );
        Ok(report)
    }

    /// 按选中的材料类别生成报价单费率表
    ///
    /// 未知类别视为输入错误。
    pub fn material_groups(&self, material_types: &[String]) -> ApiResult<Vec<MaterialGroup>> {
        material_types
            .iter()
            .map(|material_type| {
                let material = self
                    .repo
                    .find_by_type(material_type)?
                    .ok_or_else(|| ApiError::NotFound(format!("材料类别 {} 不存在", material_type)))?;
                Ok(MaterialGroup {
                    rows: material
                        .options
                        .iter()
                        .map(|(name, option)| RateRow::new(name.as_str(), option.rate, option.uom.as_str()))
                        .collect(),
                    material_type: material.material_type,
                })
            })
            .collect()
    }
}
