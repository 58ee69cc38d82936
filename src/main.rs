// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Kehys CLI - Clickjacking Exposure Tester

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use kehys::report::{missing_headers_text, status_text};
use kehys::security::FrameAncestors;
use kehys::{
    analyze, create_report_sink, poc_html, ClickjackTester, HeaderFetcher, HeaderSet,
    ReportFormat, ReportSink, TesterConfig,
};
use tracing::warn;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kehys=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    match args[1].as_str() {
        "test" => {
            let options = match TestOptions::parse(&args[2..]) {
                Ok(o) => o,
                Err(msg) => {
                    eprintln!("{}", msg);
                    eprintln!("Usage: kehys test <url> [--json] [--pdf <path>] [--out <path>] [--timeout <ms>]");
                    return ExitCode::from(1);
                }
            };
            run_test(options).await
        }
        "headers" => {
            if args.len() < 3 {
                eprintln!("Usage: kehys headers <url>...");
                return ExitCode::from(1);
            }
            show_headers(&args[2..]).await
        }
        "poc" => {
            if args.len() < 3 {
                eprintln!("Usage: kehys poc <url>");
                return ExitCode::from(1);
            }
            print!("{}", poc_html(&args[2]));
            ExitCode::SUCCESS
        }
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "--version" | "-v" | "version" => {
            println!("kehys {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"Kehys - Clickjacking Exposure Tester

USAGE:
    kehys <COMMAND> [OPTIONS]

COMMANDS:
    test <url>      Test a URL for clickjacking exposure
    headers <url>.. Show the framing protection headers of URLs
    poc <url>       Print a proof-of-concept overlay page for a URL
    help            Show this help message
    version         Show version information

TEST OPTIONS:
    --json          Print the verdict as JSON
    --pdf <path>    Write a PDF report (requires the 'pdf' feature)
    --out <path>    Write the report layout as JSON
    --timeout <ms>  Probe timer budget (default 3000)

ENVIRONMENT:
    KEHYS_PROBE_TIMEOUT_MS   Probe timer budget
    KEHYS_HEADER_SERVICE     Remote check-headers endpoint
    KEHYS_EMBEDDER_ORIGIN    Origin the probe frames from
    KEHYS_USER_AGENT         User agent string
    KEHYS_WATERMARK          Watermark image for reports
    RUST_LOG                 Log filter

EXIT STATUS:
    0 not vulnerable, 2 vulnerable, 1 error or indeterminate

EXAMPLES:
    kehys test https://example.com
    kehys test https://example.com --pdf clickjacking_report.pdf
    kehys poc https://example.com > poc.html
"#
    );
}

struct TestOptions {
    url: String,
    json: bool,
    pdf: Option<PathBuf>,
    out: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl TestOptions {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut url = None;
        let mut json = false;
        let mut pdf = None;
        let mut out = None;
        let mut timeout = None;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--json" => json = true,
                "--pdf" => pdf = Some(PathBuf::from(value_of(&mut iter, "--pdf")?)),
                "--out" => out = Some(PathBuf::from(value_of(&mut iter, "--out")?)),
                "--timeout" => {
                    let ms = value_of(&mut iter, "--timeout")?;
                    let ms: u64 = ms
                        .parse()
                        .map_err(|_| format!("Invalid --timeout value: {}", ms))?;
                    timeout = Some(Duration::from_millis(ms));
                }
                flag if flag.starts_with("--") => return Err(format!("Unknown option: {}", flag)),
                value if url.is_none() => url = Some(value.to_string()),
                extra => return Err(format!("Unexpected argument: {}", extra)),
            }
        }

        Ok(Self {
            url: url.ok_or("Missing <url>")?,
            json,
            pdf,
            out,
            timeout,
        })
    }
}

fn value_of<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<&'a String, String> {
    iter.next().ok_or_else(|| format!("{} needs a value", flag))
}

fn load_config() -> Option<TesterConfig> {
    match TesterConfig::from_env() {
        Ok(c) => Some(c),
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            None
        }
    }
}

async fn run_test(options: TestOptions) -> ExitCode {
    let Some(mut config) = load_config() else {
        return ExitCode::from(1);
    };
    if let Some(timeout) = options.timeout {
        config = config.probe_timeout(timeout);
    }

    let tester = match ClickjackTester::from_config(&config) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to create tester: {}", e);
            return ExitCode::from(1);
        }
    };

    if !options.json {
        println!("Testing: {}", options.url);
    }

    let session = tester.run(&options.url).await;
    let verdict = &session.verdict;

    if options.json {
        match serde_json::to_string_pretty(verdict) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize verdict: {}", e);
                return ExitCode::from(1);
            }
        }
    } else {
        println!("\n=== Verdict ===");
        println!("Site: {}", verdict.target_url);
        println!("IP: {}", verdict.source_ip);
        println!("Missing headers: {}", missing_headers_text(verdict));
        if let Some(probe) = &verdict.probe {
            println!(
                "Probe: rendered={} interactive={} timed_out={}",
                probe.rendered, probe.interactive, probe.timed_out
            );
        }
        println!("Status: {}", status_text(verdict.is_vulnerable));
        println!("Reason: {}", verdict.rationale);
        if let Some(error) = &verdict.fetch_error {
            println!("Error: {}", error);
        }
    }

    let outputs = [(ReportFormat::Pdf, &options.pdf), (ReportFormat::Json, &options.out)];
    if outputs.iter().any(|(_, path)| path.is_some()) {
        let report = tester.reporter().render(verdict);
        for (format, path) in outputs {
            let Some(path) = path else { continue };
            if let Err(e) = create_report_sink(format).save(&report, path) {
                eprintln!("Failed to write {}: {}", path.display(), e);
                return ExitCode::from(1);
            }
            if !options.json {
                println!("Report written to {}", path.display());
            }
        }
    }

    match verdict.is_vulnerable {
        Some(true) => {
            if !options.json {
                println!("\n[VULNERABLE] Page can be framed and interacted with");
            }
            ExitCode::from(2)
        }
        Some(false) => ExitCode::SUCCESS,
        None => ExitCode::from(1),
    }
}

fn has_permissive_frame_ancestors(headers: &HeaderSet) -> bool {
    headers
        .get("content-security-policy")
        .map(|csp| FrameAncestors::from_header(csp).iter().any(|fa| fa.is_permissive()))
        .unwrap_or(false)
}

async fn show_headers(urls: &[String]) -> ExitCode {
    let Some(config) = load_config() else {
        return ExitCode::from(1);
    };

    let fetcher: Arc<dyn HeaderFetcher> = match build_fetcher(&config) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return ExitCode::from(1);
        }
    };

    let results = futures::future::join_all(urls.iter().map(|url| fetcher.fetch(url))).await;

    let mut failed = false;
    for (url, result) in urls.iter().zip(results) {
        println!("\n=== {} ===", url);
        match result {
            Ok(fetched) => {
                let signal = analyze(&fetched.headers);

                println!("Headers ({}):", fetched.headers.len());
                for (name, value) in fetched.headers.iter() {
                    println!("  {}: {}", name, value);
                }
                println!("IP: {}", fetched.ip);
                println!("X-Frame-Options protection: {}", signal.has_frame_deny);
                println!("CSP frame-ancestors protection: {}", signal.has_csp_frame_ancestors);
                if signal.missing.is_empty() {
                    println!("[OK] Both framing protections present");
                } else {
                    println!("[!] Missing: {}", signal.missing.join(", "));
                }
                if has_permissive_frame_ancestors(&fetched.headers) {
                    warn!("{} sends a frame-ancestors list that admits any site", url);
                    println!("[!] frame-ancestors admits any site; counted as present above");
                }
            }
            Err(e) => {
                eprintln!("Failed to fetch headers: {}", e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn build_fetcher(config: &TesterConfig) -> kehys::Result<Arc<dyn HeaderFetcher>> {
    let client = kehys::HttpClient::with_config(config.http_config())?;
    Ok(match &config.header_service {
        Some(endpoint) => Arc::new(kehys::HeaderServiceClient::new(client, endpoint)?),
        None => Arc::new(kehys::DirectHeaderFetcher::new(client)),
    })
}
