use android_adb_client::check_connection;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut path: Option<String> = None;
    for arg in std::env::args().skip(1) {
        if arg == "--help" || arg == "-h" {
            print_help();
            return;
        } else if arg == "--version" || arg == "-v" {
            println!("adb-doctor v{}", env!("CARGO_PKG_VERSION"));
            return;
        } else if let Some(rest) = arg.strip_prefix("--path=") {
            path = Some(rest.to_string());
        } else {
            eprintln!("❌ Unknown argument: {arg}");
            print_help();
            std::process::exit(2);
        }
    }

    if check_connection(path.as_deref()).await {
        println!("✅ adb connection successful");
    } else {
        println!("❌ adb connection failed");
        std::process::exit(1);
    }
}

fn print_help() {
    println!("adb-doctor - check that adb and a device are reachable");
    println!();
    println!("USAGE:");
    println!("    adb-doctor [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --path=<path>   Use a specific adb binary instead of PATH lookup");
    println!("    --help, -h      Show this help message");
    println!("    --version, -v   Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    adb-doctor");
    println!("    adb-doctor --path=/opt/platform-tools/adb");
}
