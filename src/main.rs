fn main() {
    if let Err(e) = mcduck_web_lib::run() {
        log::error!("アプリケーションの実行中にエラーが発生しました: {e}");
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}
