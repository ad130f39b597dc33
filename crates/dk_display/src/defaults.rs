/// 指定配置文件路径的环境变量
pub const CONFIG_ENV_VAR: &str = "DK_DISPLAY_CONFIG";

pub fn default_log_filter() -> String {
    "info".to_string()
}

// 配置目录默认值
pub fn default_config_dir() -> String {
    // 优先使用用户主目录
    if let Ok(home_dir) = std::env::var("USERPROFILE") {
        return home_dir;
    }
    if let Ok(home_dir) = std::env::var("HOME") {
        return home_dir;
    }

    // 回退：程序所在目录
    if let Ok(exe_path) = std::env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        return exe_dir.to_string_lossy().to_string();
    }

    ".".to_string()
}
