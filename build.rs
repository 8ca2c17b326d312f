fn main() {
    // Exposes GIT_COMMIT_HASH and friends through `built_info`
    built::write_built_file().expect("Failed to acquire build-time information");
}
