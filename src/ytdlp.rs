// yt-dlp invocation contract: argument vectors and output parsing

use std::path::Path;

use regex::Regex;

use crate::downloader::models::DownloadOptions;

/// What a download invocation is pointed at
#[derive(Debug, Clone, Copy)]
pub enum DownloadTarget<'a> {
    /// A single URL argument
    Url(&'a str),
    /// A file with one URL per line (`-a`)
    BatchFile(&'a Path),
}

/// Builds argument vectors for the yt-dlp binary
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: String,
    options: DownloadOptions,
}

impl YtDlp {
    pub fn new(program: impl Into<String>, options: DownloadOptions) -> Self {
        Self {
            program: program.into(),
            options,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Cookies, proxy and the optional player client override
    fn common_args(&self, alternate_client: bool) -> Vec<String> {
        let mut args = Vec::new();

        if alternate_client {
            args.push("--extractor-args".to_string());
            args.push(format!(
                "youtube:player_client={}",
                self.options.alternate_client
            ));
        }

        if let Some(browser) = &self.options.cookies_browser {
            args.push("--cookies-from-browser".to_string());
            args.push(browser.clone());
        }

        if let Some(proxy) = &self.options.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args
    }

    /// Full JSON info, no download
    pub fn metadata_args(&self, url: &str, alternate_client: bool) -> Vec<String> {
        let mut args = vec![
            "-J".to_string(),
            "--skip-download".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
        ];
        args.extend(self.common_args(alternate_client));
        args.push(url.to_string());
        args
    }

    pub fn download_args(
        &self,
        format_spec: &str,
        target: DownloadTarget<'_>,
        output_dir: &Path,
        alternate_client: bool,
    ) -> Vec<String> {
        let opts = &self.options;
        let mut args = vec![
            "-f".to_string(),
            format_spec.to_string(),
            "--newline".to_string(),
            "-P".to_string(),
            output_dir.to_string_lossy().to_string(),
            "-o".to_string(),
            opts.output_template.clone(),
            "--merge-output-format".to_string(),
            opts.merge_format.clone(),
            "-N".to_string(),
            opts.concurrent_fragments.to_string(),
            "--http-chunk-size".to_string(),
            opts.http_chunk_size.clone(),
        ];

        if let Some(acc) = &opts.accelerator {
            args.push("--external-downloader".to_string());
            args.push(acc.program.clone());
            args.push("--external-downloader-args".to_string());
            args.push(format!(
                "aria2c:-x {} -s {} -k {}",
                acc.connections, acc.split, acc.min_split_size
            ));
        }

        if let Some(ffmpeg) = &opts.ffmpeg_location {
            args.push("--ffmpeg-location".to_string());
            args.push(ffmpeg.clone());
        }

        args.extend(self.common_args(alternate_client));

        match target {
            DownloadTarget::Url(url) => {
                args.push("--no-playlist".to_string());
                args.push(url.to_string());
            }
            DownloadTarget::BatchFile(path) => {
                args.push("-a".to_string());
                args.push(path.to_string_lossy().to_string());
            }
        }

        args
    }
}

/// Parse a yt-dlp progress line like
/// `[download]   6.2% of ~ 343.72MiB at  420.30KiB/s ETA 12:32 (frag 29/454)`
/// into a short status for logging.
pub fn parse_progress(line: &str) -> Option<String> {
    lazy_static::lazy_static! {
        static ref PROGRESS_RE: Regex = Regex::new(
            r"\[download\]\s+(\d+\.?\d*)%\s+of\s+~?\s*(\d+\.?\d*\s*\w+)(?:\s+at\s+(\S+/s))?(?:\s+ETA\s+(\S+))?"
        ).unwrap();
        static ref DEST_RE: Regex = Regex::new(r"\[download\]\s+Destination:\s+(.+)").unwrap();
        static ref MERGE_RE: Regex = Regex::new(r"\[Merger?\]\s+Merging").unwrap();
        static ref ALREADY_RE: Regex = Regex::new(r"has already been downloaded").unwrap();
    }

    if let Some(caps) = PROGRESS_RE.captures(line) {
        let percent: f32 = caps.get(1)?.as_str().parse().ok()?;
        let size = caps.get(2).map_or("?", |m| m.as_str());
        let status = match (caps.get(3), caps.get(4)) {
            (Some(speed), Some(eta)) => format!(
                "{:.1}% of {} @ {} ETA {}",
                percent,
                size,
                speed.as_str(),
                eta.as_str()
            ),
            (Some(speed), None) => format!("{:.1}% of {} @ {}", percent, size, speed.as_str()),
            _ => format!("{:.1}% of {}", percent, size),
        };
        return Some(status);
    }

    if let Some(caps) = DEST_RE.captures(line) {
        let filename = caps.get(1).map_or("file", |m| m.as_str());
        let short_name = Path::new(filename)
            .file_name()
            .map_or_else(|| filename.to_string(), |n| n.to_string_lossy().to_string());
        return Some(format!("starting {}", short_name));
    }

    if MERGE_RE.is_match(line) {
        return Some("merging video and audio".to_string());
    }

    if ALREADY_RE.is_match(line) {
        return Some("already downloaded".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::models::AcceleratorOptions;

    fn ytdlp() -> YtDlp {
        YtDlp::new("yt-dlp", DownloadOptions::default())
    }

    fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    #[test]
    fn test_metadata_args_without_alternate() {
        let args = ytdlp().metadata_args("https://youtu.be/x", false);
        assert_eq!(args[0], "-J");
        assert!(args.contains(&"--skip-download".to_string()));
        assert!(!args.contains(&"--extractor-args".to_string()));
        assert_eq!(args.last().unwrap(), "https://youtu.be/x");
    }

    #[test]
    fn test_metadata_args_with_alternate_client() {
        let args = ytdlp().metadata_args("https://youtu.be/x", true);
        assert_eq!(
            value_after(&args, "--extractor-args"),
            Some("youtube:player_client=android")
        );
    }

    #[test]
    fn test_download_args_single_url() {
        let args = ytdlp().download_args(
            "18/worst",
            DownloadTarget::Url("https://youtu.be/x"),
            Path::new("/tmp/out"),
            false,
        );
        assert_eq!(value_after(&args, "-f"), Some("18/worst"));
        assert_eq!(value_after(&args, "-P"), Some("/tmp/out"));
        assert_eq!(value_after(&args, "-o"), Some("%(title)s.%(ext)s"));
        assert_eq!(value_after(&args, "--merge-output-format"), Some("mp4"));
        assert_eq!(value_after(&args, "--external-downloader"), Some("aria2c"));
        assert_eq!(
            value_after(&args, "--external-downloader-args"),
            Some("aria2c:-x 16 -s 16 -k 1M")
        );
        assert_eq!(value_after(&args, "--cookies-from-browser"), Some("chrome"));
        assert_eq!(args.last().unwrap(), "https://youtu.be/x");
    }

    #[test]
    fn test_download_args_batch_file_without_accelerator() {
        let options = DownloadOptions {
            accelerator: None,
            cookies_browser: None,
            proxy: Some("socks5h://127.0.0.1:1080".to_string()),
            ..DownloadOptions::default()
        };
        let args = YtDlp::new("yt-dlp", options).download_args(
            "worst",
            DownloadTarget::BatchFile(Path::new("/tmp/list.txt")),
            Path::new("/tmp/out"),
            true,
        );
        assert_eq!(value_after(&args, "-a"), Some("/tmp/list.txt"));
        assert!(!args.contains(&"--external-downloader".to_string()));
        assert!(!args.contains(&"--cookies-from-browser".to_string()));
        assert_eq!(value_after(&args, "--proxy"), Some("socks5h://127.0.0.1:1080"));
        assert!(args.contains(&"--extractor-args".to_string()));
    }

    #[test]
    fn test_custom_accelerator_flags() {
        let options = DownloadOptions {
            accelerator: Some(AcceleratorOptions {
                program: "/usr/bin/aria2c".to_string(),
                connections: 8,
                split: 4,
                min_split_size: "2M".to_string(),
            }),
            ..DownloadOptions::default()
        };
        let args = YtDlp::new("yt-dlp", options).download_args(
            "worst",
            DownloadTarget::Url("u"),
            Path::new("o"),
            false,
        );
        assert_eq!(value_after(&args, "--external-downloader"), Some("/usr/bin/aria2c"));
        assert_eq!(
            value_after(&args, "--external-downloader-args"),
            Some("aria2c:-x 8 -s 4 -k 2M")
        );
    }

    #[test]
    fn test_parse_progress_line() {
        let line = "[download]  12.5% of ~ 310.04MiB at  374.36KiB/s ETA 11:59 (frag 56/454)";
        assert_eq!(
            parse_progress(line).as_deref(),
            Some("12.5% of 310.04MiB @ 374.36KiB/s ETA 11:59")
        );
    }

    #[test]
    fn test_parse_destination_and_merge() {
        assert_eq!(
            parse_progress("[download] Destination: /videos/Knowledge/Talk.f18.mp4").as_deref(),
            Some("starting Talk.f18.mp4")
        );
        assert_eq!(
            parse_progress("[Merger] Merging formats into \"Talk.mp4\"").as_deref(),
            Some("merging video and audio")
        );
        assert!(parse_progress("[youtube] abc: Downloading webpage").is_none());
    }
}
