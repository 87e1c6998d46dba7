use crate::domain::models::Locale;

// VNPay 返回码，NganLuong 的交易状态码沿用同一张表
const CODES: &[(&str, &str, &str)] = &[
    ("00", "Giao dịch thành công", "Approved"),
    ("01", "Giao dịch đã tồn tại", "Transaction is already exist"),
    (
        "02",
        "Merchant không hợp lệ (kiểm tra lại vnp_TmnCode)",
        "Invalid merchant (check vnp_TmnCode value)",
    ),
    ("03", "Dữ liệu gửi sang không đúng định dạng", "Sent data is not in the right format"),
    (
        "04",
        "Khởi tạo GD không thành công do Website đang bị tạm khóa",
        "Payment website is not available",
    ),
    (
        "05",
        "Giao dịch không thành công do: Quý khách nhập sai mật khẩu thanh toán quá số lần quy định. Xin quý khách vui lòng thực hiện lại giao dịch",
        "Transaction failed: Too many wrong password input",
    ),
    (
        "06",
        "Giao dịch không thành công do Quý khách nhập sai mật khẩu xác thực giao dịch (OTP). Xin quý khách vui lòng thực hiện lại giao dịch.",
        "Transaction failed: Wrong OTP input",
    ),
    (
        "07",
        "Trừ tiền thành công. Giao dịch bị nghi ngờ (liên quan tới lừa đảo, giao dịch bất thường). Đối với giao dịch này cần merchant xác nhận thông qua merchant admin: Từ chối/Đồng ý giao dịch",
        "This transaction is suspicious",
    ),
    (
        "08",
        "Giao dịch không thành công do: Hệ thống Ngân hàng đang bảo trì. Xin quý khách tạm thời không thực hiện giao dịch bằng thẻ/tài khoản của Ngân hàng này.",
        "Transaction failed: The banking system is under maintenance. Please do not temporarily make transactions by card / account of this Bank.",
    ),
    (
        "09",
        "Giao dịch không thành công do: Thẻ/Tài khoản của khách hàng chưa đăng ký dịch vụ InternetBanking tại ngân hàng.",
        "Transaction failed: Cards / accounts of customer who has not yet registered for Internet Banking service.",
    ),
    (
        "10",
        "Giao dịch không thành công do: Khách hàng xác thực thông tin thẻ/tài khoản không đúng quá 3 lần",
        "Transaction failed: Customer incorrectly validate the card / account information more than 3 times",
    ),
    (
        "11",
        "Giao dịch không thành công do: Đã hết hạn chờ thanh toán. Xin quý khách vui lòng thực hiện lại giao dịch.",
        "Transaction failed: Pending payment is expired. Please try again.",
    ),
    ("24", "Giao dịch không thành công do: Khách hàng hủy giao dịch", "Transaction canceled"),
    (
        "51",
        "Giao dịch không thành công do: Tài khoản của quý khách không đủ số dư để thực hiện giao dịch.",
        "Transaction failed: Your account is not enough balance to make the transaction.",
    ),
    (
        "65",
        "Giao dịch không thành công do: Tài khoản của Quý khách đã vượt quá hạn mức giao dịch trong ngày.",
        "Transaction failed: Your account has exceeded the daily limit.",
    ),
    ("75", "Ngân hàng thanh toán đang bảo trì", "Banking system is under maintenance"),
];

const DEFAULT: (&str, &str) = ("Giao dịch thất bại", "Failured");

pub fn message(code: &str, locale: Locale) -> &'static str {
    let (vn, en) = CODES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, vn, en)| (*vn, *en))
        .unwrap_or(DEFAULT);

    match locale {
        Locale::Vn => vn,
        Locale::En => en,
    }
}
