mod zeroize_on_failure;
