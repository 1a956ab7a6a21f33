error_chain! {
    foreign_links {
        Io(::std::io::Error);
        ParseInt(::std::num::ParseIntError);
        Ros(::rosrust::error::Error);
    }
    errors {
        MissingArgument(position: usize) {
            description("Missing positional argument")
            display("Missing positional argument at position {}", position)
        }
        Communication(service: String) {
            description("Failed to communicate with service")
            display("Failed to communicate with service {}", service)
        }
        ServiceFailed(service: String, message: String) {
            description("Service reported a failure")
            display("Service {} reported a failure: {}", service, message)
        }
        NameTaken(name: String) {
            description("Node name is already registered")
            display("Node name {} is already registered", name)
        }
        Duplicate(name: String) {
            description("Could not add duplicate")
            display("Could not add duplicate {}", name)
        }
        TypeMismatch(name: String, expected: String, actual: String) {
            description("Message type mismatch")
            display("Type mismatch on {}: expected {}, got {}", name, expected, actual)
        }
        Closed(name: String) {
            description("Connection is closed")
            display("Connection to {} is closed", name)
        }
    }
}
