fn main() {
    snap_puzzle::run();
}
