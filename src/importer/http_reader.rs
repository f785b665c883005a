// ==========================================
// 需求预测与产能排产系统 - 远程表格读取器
// ==========================================
// 职责: http(s) 定位符 → GET 响应体 → CSV 表格
// 默认读取器: SourceTabularReader（远程走 HTTP，本地走文件）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{is_remote_locator, CsvParser, FileTabularReader};
use crate::importer::tabular_reader_trait::{TabularData, TabularReader};
use std::time::Duration;
use tracing::{debug, instrument};

/// 默认请求超时（秒）
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// ==========================================
// HttpTabularReader - HTTP CSV 读取器
// ==========================================
#[derive(Debug, Clone)]
pub struct HttpTabularReader {
    timeout: Duration,
    use_system_proxy: bool,
}

impl Default for HttpTabularReader {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTabularReader {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            use_system_proxy: true,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 忽略 HTTP_PROXY / HTTPS_PROXY 环境变量直连
    pub fn without_proxy(mut self) -> Self {
        self.use_system_proxy = false;
        self
    }

    fn fetch(&self, url: &str) -> ImportResult<TabularData> {
        let remote_error = |e: reqwest::Error| ImportError::RemoteFetchError {
            url: url.to_string(),
            message: e.to_string(),
        };

        let mut builder = reqwest::blocking::Client::builder().timeout(self.timeout);
        if !self.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(remote_error)?;

        let response = client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(remote_error)?;
        let body = response.bytes().map_err(remote_error)?;
        debug!(bytes = body.len(), "远程数据源下载完成");

        CsvParser.parse_reader(body.as_ref())
    }
}

impl TabularReader for HttpTabularReader {
    #[instrument(skip(self))]
    fn read(&self, locator: &str) -> ImportResult<TabularData> {
        let url = locator.trim();
        if !is_remote_locator(url) {
            return Err(ImportError::UnsupportedLocator(locator.to_string()));
        }

        // 阻塞客户端不能在异步运行时线程内创建或销毁，放到独立线程执行
        std::thread::scope(|scope| scope.spawn(|| self.fetch(url)).join()).map_err(|_| {
            ImportError::RemoteFetchError {
                url: url.to_string(),
                message: "下载线程异常终止".to_string(),
            }
        })?
    }
}

// ==========================================
// SourceTabularReader - 按定位符分派
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct SourceTabularReader {
    file: FileTabularReader,
    http: HttpTabularReader,
}

impl SourceTabularReader {
    pub fn new(http: HttpTabularReader) -> Self {
        Self {
            file: FileTabularReader,
            http,
        }
    }
}

impl TabularReader for SourceTabularReader {
    fn read(&self, locator: &str) -> ImportResult<TabularData> {
        if is_remote_locator(locator) {
            self.http.read(locator)
        } else {
            self.file.read(locator)
        }
    }
}
