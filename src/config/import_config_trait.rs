// ==========================================
// 组合分析数据导入系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义编排器所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入编排所需的只读配置接口
// 实现者: ImportConfig（从 JSON 文件读取）
pub trait ImportConfigReader: Send + Sync {
    /// 主键字段配置（逗号分隔原文；无配置时编排器用变体默认值）
    fn pk(&self) -> Option<&str>;

    /// 默认扫描根目录
    fn base_folder(&self) -> Option<&str>;
}
